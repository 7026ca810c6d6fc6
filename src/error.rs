//! Error types for the backup pipeline.
//!
//! Errors carry the operation and path that failed so a log line is enough
//! to reproduce the problem. Messages stay constant; context lives in fields.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for backup operations.
pub type BackupResult<T> = Result<T, BackupError>;

/// Errors produced while building, storing or trashing archives.
#[derive(Debug, Error)]
pub enum BackupError {
    /// IO failures while interacting with the filesystem.
    #[error("backup io failure during {operation} on {}", path.display())]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Directory traversal failures while archiving.
    #[error("backup walk failure during {operation} on {}", path.display())]
    Walk {
        operation: &'static str,
        path: PathBuf,
        source: walkdir::Error,
    },
    /// The configured save directory does not exist or is not a directory.
    #[error("save directory {} does not exist", path.display())]
    MissingSource { path: PathBuf },
    /// A store entry with the canonical name already exists.
    #[error("store entry {} already exists", path.display())]
    EntryExists { path: PathBuf },
}

impl BackupError {
    pub(crate) fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        BackupError::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn walk(
        operation: &'static str,
        path: impl AsRef<Path>,
        source: walkdir::Error,
    ) -> Self {
        BackupError::Walk {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Configuration problems. Every variant aborts the run before any game is
/// touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no backup folder set (settings.backup_folder)")]
    MissingBackupFolder,
    #[error("settings.max_backups must be at least 1")]
    InvalidCapacity,
    #[error("could not determine the platform config directory")]
    NoConfigDir,
}
