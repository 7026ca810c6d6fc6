//! Reversible deletion.
//!
//! Evicted archives are never removed outright. They are moved into a trash
//! directory using the freedesktop.org layout:
//! - `files/` holds the moved file
//! - `info/<name>.trashinfo` records the original path and deletion date
//!
//! A file manager (or a human with `mv`) can restore them from there.
//! Name collisions get a ` (n)` suffix on the stem.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::{BackupError, BackupResult};
use crate::platform;

const INFO_EXTENSION: &str = "trashinfo";

#[derive(Debug, Clone)]
pub struct Trash {
    root: PathBuf,
}

/// Where a trashed file came from and where it went.
#[derive(Debug, Clone)]
pub struct TrashedFile {
    pub original: PathBuf,
    pub stored: PathBuf,
    pub info: PathBuf,
}

impl Trash {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Trash { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    pub fn info_dir(&self) -> PathBuf {
        self.root.join("info")
    }

    /// Moves `file` into the trash and writes its `.trashinfo` sidecar.
    pub fn trash(&self, file: &Path) -> BackupResult<TrashedFile> {
        let files_dir = self.files_dir();
        let info_dir = self.info_dir();
        fs::create_dir_all(&files_dir)
            .map_err(|e| BackupError::io("trash.create_files_dir", &files_dir, e))?;
        fs::create_dir_all(&info_dir)
            .map_err(|e| BackupError::io("trash.create_info_dir", &info_dir, e))?;

        let original = fs::canonicalize(file)
            .map_err(|e| BackupError::io("trash.canonicalize", file, e))?;
        let deleted_at = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let contents = format!("[Trash Info]\nPath={}\nDeletionDate={deleted_at}\n", original.display());

        let (stored, info) = self.reserve(&original, &contents)?;

        if let Err(e) = platform::move_file(&original, &stored) {
            // release the reservation so the info dir does not point at nothing
            let _ = fs::remove_file(&info);
            return Err(BackupError::io("trash.move", &original, e));
        }

        info!("Moved {} to trash.", original.display());
        Ok(TrashedFile {
            original,
            stored,
            info,
        })
    }

    /// Claims a free name by creating the info file exclusively.
    fn reserve(&self, original: &Path, contents: &str) -> BackupResult<(PathBuf, PathBuf)> {
        let files_dir = self.files_dir();
        let info_dir = self.info_dir();

        for counter in 0..=u32::MAX {
            let name = candidate_name(original, counter);
            let stored = files_dir.join(&name);
            if stored.exists() {
                continue;
            }

            let info = info_dir.join(format!("{name}.{INFO_EXTENSION}"));
            match OpenOptions::new().write(true).create_new(true).open(&info) {
                Ok(handle) => {
                    fill_info(handle, &info, contents)?;
                    return Ok((stored, info));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(BackupError::io("trash.create_info", &info, e)),
            }
        }

        Err(BackupError::io(
            "trash.reserve",
            original,
            io::Error::new(io::ErrorKind::AlreadyExists, "no free trash name left"),
        ))
    }
}

/// Writes the sidecar, removing it again if the write fails.
fn fill_info(mut handle: File, info: &Path, contents: &str) -> BackupResult<()> {
    if let Err(e) = handle.write_all(contents.as_bytes()) {
        drop(handle);
        let _ = fs::remove_file(info);
        return Err(BackupError::io("trash.write_info", info, e));
    }
    Ok(())
}

/// `name.ext`, then `name (1).ext`, `name (2).ext`, ...
fn candidate_name(original: &Path, counter: u32) -> String {
    let file_name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if counter == 0 {
        return file_name;
    }

    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match original.extension() {
        Some(ext) => format!("{stem} ({counter}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({counter})"),
    }
}
