use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
    Unknown,
}

pub fn detect() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::MacOS,
        "linux" => Platform::Linux,
        "windows" => Platform::Windows,
        _ => Platform::Unknown,
    }
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Expands a leading `~` to the home directory. Other paths pass through.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "savekeep")
}

/// Default config file (~/.config/savekeep/games.toml or platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("games.toml"))
}

/// Default scratch area for archives that have not been kept yet
pub fn default_scratch_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join("tmp"))
        .unwrap_or_else(|| std::env::temp_dir().join("savekeep"))
}

/// Default trash location.
/// Linux uses the freedesktop trash so evicted archives show up in file managers.
/// Other platforms get a private trash with the same files/info layout.
pub fn default_trash_dir(platform: Platform) -> PathBuf {
    let base = BaseDirs::new();
    match (platform, base) {
        (Platform::Linux | Platform::Unknown, Some(base)) => base.data_dir().join("Trash"),
        (Platform::MacOS | Platform::Windows, Some(base)) => {
            base.data_local_dir().join("savekeep").join("Trash")
        }
        (_, None) => std::env::temp_dir().join("savekeep-trash"),
    }
}

/// Moves a file, falling back to copy + remove when rename crosses filesystems.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            // EXDEV has no stable ErrorKind, so any rename failure gets one copy attempt
            if !from.is_file() {
                return Err(rename_err);
            }
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
