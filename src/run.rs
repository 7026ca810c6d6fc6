//! Backup run orchestration.
//!
//! One run visits every configured game in name order:
//! 1. build a scratch archive of the save directory
//! 2. compare its fingerprint against the newest stored archive
//! 3. if it is new, move it into the store and trash the oldest entry when
//!    the store is over capacity
//! 4. add the game to the report
//!
//! A failing game is logged and left out of the report; the remaining games
//! still run. SAVEGAMES.md is written once, after the last game.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, error, info, info_span, warn};

use crate::archive;
use crate::config::{Config, GameEntry};
use crate::error::{BackupError, BackupResult};
use crate::report::markdown::{self, Report, ReportEntry};
use crate::slug;
use crate::store::retention::{self, Novelty};
use crate::store::{canonical_name, ArchiveStore};
use crate::trash::Trash;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Build and compare archives but leave stores, trash and report untouched.
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct GameFailure {
    pub name: String,
    pub error: BackupError,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub kept: usize,
    pub unchanged: usize,
    pub evicted: usize,
    pub failures: Vec<GameFailure>,
    /// None on dry runs.
    pub report_path: Option<PathBuf>,
}

enum Outcome {
    Kept { path: PathBuf, evicted: bool },
    Unchanged,
}

/// Everything a run shares across games. The timestamp is captured once so
/// all archives of a run carry the same one in their names.
struct RunContext<'a> {
    config: &'a Config,
    options: RunOptions,
    started: DateTime<Local>,
    trash: Trash,
}

pub fn execute(config: &Config, options: RunOptions) -> BackupResult<RunSummary> {
    execute_at(config, options, Local::now())
}

/// Same as [`execute`] with an explicit run start time.
pub fn execute_at(
    config: &Config,
    options: RunOptions,
    started: DateTime<Local>,
) -> BackupResult<RunSummary> {
    let ctx = RunContext {
        config,
        options,
        started,
        trash: Trash::new(&config.trash_folder),
    };
    let mut report = Report::new();
    let mut summary = RunSummary::default();

    if options.dry_run {
        info!("Dry run: stores, trash and report stay untouched.");
    }

    for game in &config.games {
        let span = info_span!("game", name = %game.name);
        let _enter = span.enter();

        match process_game(&ctx, game) {
            Ok(Outcome::Kept { path, evicted }) => {
                debug!("kept {}", path.display());
                summary.kept += 1;
                if evicted {
                    summary.evicted += 1;
                }
                report.push(report_entry(game, started.naive_local()));
            }
            Ok(Outcome::Unchanged) => {
                summary.unchanged += 1;
                report.push(report_entry(game, started.naive_local()));
            }
            Err(e) => {
                error!("Backup of '{}' failed: {e}", game.name);
                summary.failures.push(GameFailure {
                    name: game.name.clone(),
                    error: e,
                });
            }
        }
    }

    let rendered = report.render(started.naive_local());
    if !options.dry_run {
        let path = markdown::write(&config.backup_folder, &rendered)?;
        summary.report_path = Some(path);
    }
    debug!("==========\n{rendered}\n==========");
    info!("Backup finished on {}", started.format("%Y-%m-%d, %H:%M"));

    Ok(summary)
}

fn process_game(ctx: &RunContext<'_>, game: &GameEntry) -> BackupResult<Outcome> {
    let slug = slug::sanitize(&game.name);
    let scratch = ctx
        .config
        .scratch_folder
        .join(format!("{slug}.{}", archive::EXTENSION));

    archive::build(&game.path, &scratch)?;

    let store = ArchiveStore::open(&ctx.config.backup_folder, &slug);
    if !ctx.options.dry_run {
        store.ensure()?;
    }

    let novelty = retention::assess(&scratch, &store)?;
    debug!("fingerprint {}", novelty.fingerprint());

    if let Novelty::Unchanged { newest, .. } = novelty {
        info!("No changes since {}.", newest.path.display());
        return Ok(Outcome::Unchanged);
    }

    let name = canonical_name(ctx.started.date_naive(), &slug, ctx.started.timestamp());

    if ctx.options.dry_run {
        let count = store.list_by_creation_time()?.len() + 1;
        info!("Would keep {name}.");
        if count > ctx.config.capacity {
            warn!("Would trash the oldest archive of {}.", store.dir().display());
        }
        return Ok(Outcome::Kept {
            path: store.dir().join(name),
            evicted: count > ctx.config.capacity,
        });
    }

    let path = store.insert(&scratch, &name)?;
    let evicted = store
        .evict_oldest_if_over_capacity(ctx.config.capacity, &ctx.trash)?
        .is_some();

    Ok(Outcome::Kept { path, evicted })
}

fn report_entry(game: &GameEntry, last_update: NaiveDateTime) -> ReportEntry {
    ReportEntry {
        name: game.name.clone(),
        path: game.path.clone(),
        comment: game.comment.clone(),
        last_update,
    }
}
