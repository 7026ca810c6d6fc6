//! games.toml loading and validation.
//!
//! The only fatal problems are an unreadable/unparsable file and a missing
//! backup folder. Game entries without a name or path are dropped quietly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::platform;
use crate::store::DEFAULT_CAPACITY;

/// A game whose save directory gets backed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntry {
    pub name: String,
    pub path: PathBuf,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Sorted by name.
    pub games: Vec<GameEntry>,
    pub backup_folder: PathBuf,
    pub scratch_folder: PathBuf,
    pub trash_folder: PathBuf,
    pub capacity: usize,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    games: Vec<RawGame>,
    #[serde(default)]
    settings: RawSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    backup_folder: Option<String>,
    scratch_folder: Option<String>,
    trash_folder: Option<String>,
    max_backups: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    name: Option<String>,
    path: Option<String>,
    comment: Option<String>,
}

impl RawGame {
    fn into_entry(self) -> Option<GameEntry> {
        let name = non_empty(self.name)?;
        let path = non_empty(self.path)?;
        Some(GameEntry {
            name,
            path: platform::expand_tilde(Path::new(&path)),
            comment: non_empty(self.comment),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Picks the config file: the explicit path if given, else the platform default.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => platform::default_config_path().ok_or(ConfigError::NoConfigDir),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parses and validates config text. `origin` is only used in errors.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let backup_folder = non_empty(raw.settings.backup_folder)
            .map(|p| platform::expand_tilde(Path::new(&p)))
            .ok_or(ConfigError::MissingBackupFolder)?;

        let capacity = raw.settings.max_backups.unwrap_or(DEFAULT_CAPACITY);
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }

        let host = platform::detect();
        let scratch_folder = non_empty(raw.settings.scratch_folder)
            .map(|p| platform::expand_tilde(Path::new(&p)))
            .unwrap_or_else(platform::default_scratch_dir);
        let trash_folder = non_empty(raw.settings.trash_folder)
            .map(|p| platform::expand_tilde(Path::new(&p)))
            .unwrap_or_else(|| platform::default_trash_dir(host));

        let mut games: Vec<GameEntry> = raw
            .games
            .into_iter()
            .filter_map(RawGame::into_entry)
            .collect();
        // stable, byte-wise so "Zelda" sorts before "abe"
        games.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Config {
            games,
            backup_folder,
            scratch_folder,
            trash_folder,
            capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        Config::parse(text, Path::new("games.toml"))
    }

    #[test]
    fn games_are_sorted_by_name() {
        let config = parse(
            r#"
            [settings]
            backup_folder = "/backups"

            [[games]]
            name = "Zelda"
            path = "/saves/zelda"

            [[games]]
            name = "Abe"
            path = "/saves/abe"
            comment = "Oddworld"
            "#,
        )
        .unwrap();

        let names: Vec<&str> = config.games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Abe", "Zelda"]);
        assert_eq!(config.games[0].comment.as_deref(), Some("Oddworld"));
        assert_eq!(config.backup_folder, PathBuf::from("/backups"));
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn sort_is_case_sensitive() {
        let config = parse(
            r#"
            settings = { backup_folder = "/b" }
            games = [
                { name = "abe", path = "/a" },
                { name = "Zelda", path = "/z" },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(config.games[0].name, "Zelda");
    }

    #[test]
    fn entries_without_name_or_path_are_dropped() {
        let config = parse(
            r#"
            [settings]
            backup_folder = "/backups"

            [[games]]
            name = "No Path"

            [[games]]
            path = "/saves/anon"

            [[games]]
            name = ""
            path = "/saves/blank"

            [[games]]
            name = "Kept"
            path = "/saves/kept"
            comment = ""
            "#,
        )
        .unwrap();

        assert_eq!(
            config.games,
            vec![GameEntry {
                name: "Kept".into(),
                path: PathBuf::from("/saves/kept"),
                comment: None,
            }]
        );
    }

    #[test]
    fn missing_backup_folder_is_fatal() {
        let err = parse("[[games]]\nname = \"A\"\npath = \"/a\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingBackupFolder));

        let err = parse("[settings]\nbackup_folder = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingBackupFolder));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = parse("[settings]\nbackup_folder = \"/b\"\nmax_backups = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCapacity));
    }

    #[test]
    fn optional_folders_override_defaults() {
        let config = parse(
            r#"
            [settings]
            backup_folder = "/b"
            scratch_folder = "/scratch"
            trash_folder = "/trash"
            max_backups = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.scratch_folder, PathBuf::from("/scratch"));
        assert_eq!(config.trash_folder, PathBuf::from("/trash"));
        assert_eq!(config.capacity, 3);
        assert!(config.games.is_empty());
    }

    #[test]
    fn unset_folders_fall_back_to_host_defaults() {
        let config = parse("[settings]\nbackup_folder = \"/b\"\n").unwrap();

        assert_eq!(config.scratch_folder, platform::default_scratch_dir());
        assert_eq!(
            config.trash_folder,
            platform::default_trash_dir(platform::detect())
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse("[settings\nbackup_folder = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
