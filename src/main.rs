use std::error::Error;
use std::path::Path;

use clap::Parser;
use savekeep::cli::{Cli, Command, ListArgs, RunArgs};
use savekeep::config::Config;
use savekeep::error::ConfigError;
use savekeep::logging;
use savekeep::report::{self, GameListing};
use savekeep::run::{self, RunOptions};
use savekeep::slug;
use savekeep::store::ArchiveStore;
use tracing::{error, info, warn};

/// Formats an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = Config::locate(explicit)?;
    Config::load(&path)
}

fn run_backup(args: &RunArgs) -> i32 {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(ConfigError::MissingBackupFolder) => {
            warn!("No backup folder set. Aborting...");
            return 1;
        }
        Err(e) => {
            error!("{}", error_chain(&e));
            return 1;
        }
    };

    let options = RunOptions {
        dry_run: args.dry_run,
    };

    match run::execute(&config, options) {
        Ok(summary) => {
            info!(
                "{} kept, {} unchanged, {} trashed, {} failed",
                summary.kept,
                summary.unchanged,
                summary.evicted,
                summary.failures.len()
            );
            for failure in &summary.failures {
                warn!("{}: {}", failure.name, error_chain(&failure.error));
            }
            if let Some(path) = &summary.report_path {
                info!("Report written to {}", path.display());
            }
            0
        }
        Err(e) => {
            error!("{}", error_chain(&e));
            1
        }
    }
}

fn list_stores(args: &ListArgs) -> i32 {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", error_chain(&e));
            return 1;
        }
    };

    let mut listings = Vec::new();
    for game in &config.games {
        if args.game.as_ref().is_some_and(|wanted| wanted != &game.name) {
            continue;
        }

        let slug = slug::sanitize(&game.name);
        let store = ArchiveStore::open(&config.backup_folder, &slug);
        let entries = match store.list_by_creation_time() {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("warning: failed to list {}: {}", store.dir().display(), error_chain(&e));
                Vec::new()
            }
        };

        listings.push(GameListing {
            name: game.name.clone(),
            slug,
            store: store.dir().to_path_buf(),
            entries,
        });
    }

    if listings.is_empty() {
        if let Some(wanted) = &args.game {
            eprintln!("No configured game named '{wanted}'.");
            return 1;
        }
    }

    report::print(&listings, args.json);
    0
}

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run(args) => {
            tracing::subscriber::with_default(logging::subscriber(args.verbose), || run_backup(&args))
        }
        Command::List(args) => list_stores(&args),
        Command::Slug(args) => {
            println!("{}", slug::sanitize(&args.name));
            0
        }
    };

    std::process::exit(code);
}
