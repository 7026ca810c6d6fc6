//! Novelty test for freshly built archives.
//!
//! A new archive is worth keeping when the store is empty or when its
//! fingerprint differs from the newest stored archive. Nothing else is
//! compared. This module only decides; the caller mutates the store.

use std::path::Path;

use crate::error::BackupResult;
use crate::fingerprint::{fingerprint, Fingerprint};

use super::{ArchiveStore, StoreEntry};

#[derive(Debug, Clone)]
pub enum Novelty {
    /// The store had no archives yet.
    FirstBackup { fingerprint: Fingerprint },
    /// Newest stored archive hashes differently.
    Changed {
        fingerprint: Fingerprint,
        previous: Fingerprint,
    },
    /// Same bytes as the newest stored archive.
    Unchanged {
        fingerprint: Fingerprint,
        newest: StoreEntry,
    },
}

impl Novelty {
    pub fn is_novel(&self) -> bool {
        !matches!(self, Novelty::Unchanged { .. })
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Novelty::FirstBackup { fingerprint }
            | Novelty::Changed { fingerprint, .. }
            | Novelty::Unchanged { fingerprint, .. } => fingerprint,
        }
    }
}

pub fn assess(new_archive: &Path, store: &ArchiveStore) -> BackupResult<Novelty> {
    let current = fingerprint(new_archive)?;

    let Some(newest) = store.newest()? else {
        return Ok(Novelty::FirstBackup {
            fingerprint: current,
        });
    };

    let previous = fingerprint(&newest.path)?;
    if previous == current {
        Ok(Novelty::Unchanged {
            fingerprint: current,
            newest,
        })
    } else {
        Ok(Novelty::Changed {
            fingerprint: current,
            previous,
        })
    }
}

pub fn should_keep(new_archive: &Path, store: &ArchiveStore) -> BackupResult<bool> {
    Ok(assess(new_archive, store)?.is_novel())
}
