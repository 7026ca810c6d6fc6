//! Per-game archive store.
//!
//! Each game owns a directory `{backup_folder}/{slug}` holding its archive
//! history. There is no index: the directory listing is the store, ordered
//! by file creation time. Supports:
//! - listing oldest first, newest/oldest lookup
//! - inserting a scratch archive under a canonical name
//! - evicting the oldest entry into the trash once over capacity

pub mod retention;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::archive;
use crate::error::{BackupError, BackupResult};
use crate::platform;
use crate::trash::{Trash, TrashedFile};

/// Default number of archives kept per game.
pub const DEFAULT_CAPACITY: usize = 10;

/// One archive in a store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreEntry {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_unix")]
    pub created: SystemTime,
    pub size_bytes: u64,
}

impl StoreEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn serialize_unix<S: serde::Serializer>(time: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    let secs = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    s.serialize_i64(secs)
}

#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
}

impl ArchiveStore {
    /// Binds the store for `slug` under `backup_root`. Touches nothing on disk.
    pub fn open(backup_root: &Path, slug: &str) -> Self {
        ArchiveStore {
            dir: backup_root.join(slug),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the store directory if needed.
    pub fn ensure(&self) -> BackupResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| BackupError::io("store.ensure", &self.dir, e))
    }

    /// Regular files directly under the store, oldest first.
    /// Equal creation times fall back to file name order.
    pub fn list_by_creation_time(&self) -> BackupResult<Vec<StoreEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let read_dir =
            fs::read_dir(&self.dir).map_err(|e| BackupError::io("store.list", &self.dir, e))?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| BackupError::io("store.list", &self.dir, e))?;
            let path = dir_entry.path();
            let metadata =
                fs::metadata(&path).map_err(|e| BackupError::io("store.stat", &path, e))?;
            if !metadata.is_file() {
                continue;
            }

            // not every filesystem records a birth time
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            entries.push(StoreEntry {
                path,
                created,
                size_bytes: metadata.len(),
            });
        }

        entries.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.path.cmp(&b.path)));
        Ok(entries)
    }

    pub fn newest(&self) -> BackupResult<Option<StoreEntry>> {
        Ok(self.list_by_creation_time()?.pop())
    }

    pub fn oldest(&self) -> BackupResult<Option<StoreEntry>> {
        Ok(self.list_by_creation_time()?.into_iter().next())
    }

    /// Moves `archive` into the store as `canonical_name`. Never overwrites.
    pub fn insert(&self, archive: &Path, canonical_name: &str) -> BackupResult<PathBuf> {
        let dest = self.dir.join(canonical_name);
        if dest.exists() {
            return Err(BackupError::EntryExists { path: dest });
        }

        platform::move_file(archive, &dest)
            .map_err(|e| BackupError::io("store.insert", archive, e))?;

        info!("Moved archive to '{}'", dest.display());
        Ok(dest)
    }

    /// Trashes the single oldest entry when the store holds more than
    /// `capacity` archives.
    pub fn evict_oldest_if_over_capacity(
        &self,
        capacity: usize,
        trash: &Trash,
    ) -> BackupResult<Option<TrashedFile>> {
        let entries = self.list_by_creation_time()?;
        if entries.len() <= capacity {
            return Ok(None);
        }

        let Some(oldest) = entries.first() else {
            return Ok(None);
        };
        info!(
            "More than {capacity} files found. Deleting oldest one: {}",
            oldest.path.display()
        );
        trash.trash(&oldest.path).map(Some)
    }
}

/// `{YYYY-MM-DD}-{slug}-{unix timestamp}.tar.gz`
pub fn canonical_name(date: NaiveDate, slug: &str, timestamp: i64) -> String {
    format!(
        "{}-{slug}-{timestamp}.{}",
        date.format("%Y-%m-%d"),
        archive::EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(store: &ArchiveStore, count: usize) -> Vec<PathBuf> {
        store.ensure().unwrap();
        (0..count)
            .map(|i| {
                let path = store.dir().join(format!("2024-01-01-game-{:04}.tar.gz", 1000 + i));
                fs::write(&path, format!("archive {i}")).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn canonical_name_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            canonical_name(date, "test-game", 1_709_980_000),
            "2024-03-09-test-game-1709980000.tar.gz"
        );
    }

    #[test]
    fn missing_store_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::open(dir.path(), "nothing");
        assert!(store.list_by_creation_time().unwrap().is_empty());
        assert!(store.newest().unwrap().is_none());
        assert!(store.oldest().unwrap().is_none());
    }

    #[test]
    fn ensure_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::open(dir.path(), "game");
        store.ensure().unwrap();
        store.ensure().unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn listing_is_oldest_first_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::open(dir.path(), "game");
        let files = fill(&store, 3);
        fs::create_dir(store.dir().join("subdir")).unwrap();

        let listed: Vec<PathBuf> = store
            .list_by_creation_time()
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();

        assert_eq!(listed, files);
        assert_eq!(store.oldest().unwrap().unwrap().path, files[0]);
        assert_eq!(store.newest().unwrap().unwrap().path, files[2]);
    }

    #[test]
    fn insert_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::open(dir.path(), "game");
        store.ensure().unwrap();
        let scratch = dir.path().join("scratch.tar.gz");

        fs::write(&scratch, b"one").unwrap();
        let kept = store.insert(&scratch, "a.tar.gz").unwrap();
        assert!(!scratch.exists());
        assert_eq!(fs::read(&kept).unwrap(), b"one");

        fs::write(&scratch, b"two").unwrap();
        let err = store.insert(&scratch, "a.tar.gz").unwrap_err();
        assert!(matches!(err, BackupError::EntryExists { .. }));
        assert_eq!(fs::read(&kept).unwrap(), b"one");
    }

    #[test]
    fn at_capacity_nothing_is_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::open(dir.path(), "game");
        fill(&store, DEFAULT_CAPACITY);
        let trash = Trash::new(dir.path().join("Trash"));

        let evicted = store.evict_oldest_if_over_capacity(DEFAULT_CAPACITY, &trash).unwrap();

        assert!(evicted.is_none());
        assert_eq!(store.list_by_creation_time().unwrap().len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn over_capacity_trashes_only_the_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::open(dir.path(), "game");
        let files = fill(&store, DEFAULT_CAPACITY + 1);
        let trash = Trash::new(dir.path().join("Trash"));

        let evicted = store
            .evict_oldest_if_over_capacity(DEFAULT_CAPACITY, &trash)
            .unwrap()
            .unwrap();

        let remaining = store.list_by_creation_time().unwrap();
        assert_eq!(remaining.len(), DEFAULT_CAPACITY);
        assert!(!files[0].exists());
        assert!(remaining.iter().all(|e| e.path != files[0]));
        assert_eq!(evicted.stored, trash.files_dir().join(files[0].file_name().unwrap()));
        assert!(evicted.stored.exists());
    }
}
