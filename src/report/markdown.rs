//! SAVEGAMES.md rendering.
//!
//! The report is rebuilt from scratch each run: one section per game that
//! was processed successfully, in the order the run visited them, plus a
//! footer with the run time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{BackupError, BackupResult};

pub const FILE_NAME: &str = "SAVEGAMES.md";

const TITLE: &str = "# Savegame Backups\n";
const TIME_FORMAT: &str = "%Y-%m-%d, %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub name: String,
    pub path: PathBuf,
    pub comment: Option<String>,
    pub last_update: NaiveDateTime,
}

/// In-memory accumulator owned by a single run.
#[derive(Debug, Default)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn render(&self, run_at: NaiveDateTime) -> String {
        render(&self.entries, run_at)
    }
}

pub fn render(entries: &[ReportEntry], run_at: NaiveDateTime) -> String {
    let mut output = String::from(TITLE);

    for entry in entries {
        output.push_str(&format!("\n## {}\n\n", entry.name));
        output.push_str(&format!("- *Path*: `{}`\n", entry.path.display()));
        if let Some(comment) = &entry.comment {
            output.push_str(&format!("- *Comment*: {comment}\n"));
        }
        output.push_str(&format!(
            "- *Last update*: {}\n",
            entry.last_update.format(TIME_FORMAT)
        ));
    }

    output.push_str(&format!("\n(Last run: {})\n", run_at.format(TIME_FORMAT)));
    output
}

/// Writes the report into the backup folder, replacing any previous one.
pub fn write(backup_folder: &Path, contents: &str) -> BackupResult<PathBuf> {
    fs::create_dir_all(backup_folder)
        .map_err(|e| BackupError::io("report.create_dir", backup_folder, e))?;
    let path = backup_folder.join(FILE_NAME);
    fs::write(&path, contents).map_err(|e| BackupError::io("report.write", &path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn entry(name: &str, comment: Option<&str>) -> ReportEntry {
        ReportEntry {
            name: name.to_string(),
            path: PathBuf::from(format!("/saves/{name}")),
            comment: comment.map(str::to_string),
            last_update: at(9, 5),
        }
    }

    #[test]
    fn empty_report_has_title_and_footer() {
        assert_eq!(
            render(&[], at(21, 30)),
            "# Savegame Backups\n\n(Last run: 2024-05-17, 21:30)\n"
        );
    }

    #[test]
    fn sections_follow_the_fixed_layout() {
        let rendered = render(&[entry("Abe", Some("Oddworld")), entry("Zelda", None)], at(21, 30));

        let expected = "# Savegame Backups\n\
            \n## Abe\n\n\
            - *Path*: `/saves/Abe`\n\
            - *Comment*: Oddworld\n\
            - *Last update*: 2024-05-17, 09:05\n\
            \n## Zelda\n\n\
            - *Path*: `/saves/Zelda`\n\
            - *Last update*: 2024-05-17, 09:05\n\
            \n(Last run: 2024-05-17, 21:30)\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn caller_order_is_preserved() {
        let rendered = render(&[entry("Zelda", None), entry("Abe", None)], at(0, 0));
        let zelda = rendered.find("## Zelda").unwrap();
        let abe = rendered.find("## Abe").unwrap();
        assert!(zelda < abe);
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut report = Report::new();
        report.push(entry("Abe", None));
        assert_eq!(report.render(at(1, 2)), report.render(at(1, 2)));
        assert_eq!(report.entries().len(), 1);
    }

    #[test]
    fn write_replaces_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "old report with more text").unwrap();
        let path = write(dir.path(), "new").unwrap();

        assert_eq!(path, dir.path().join(FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }
}
