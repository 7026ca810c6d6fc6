//! SHA-256 content fingerprints of archive files.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{BackupError, BackupResult};

const CHUNK: usize = 64 * 1024;

/// Lowercase hex encoded SHA-256 digest of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hashes the file as an opaque byte stream.
pub fn fingerprint(path: &Path) -> BackupResult<Fingerprint> {
    let file = File::open(path).map_err(|e| BackupError::io("fingerprint.open", path, e))?;
    let mut reader = BufReader::with_capacity(CHUNK, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];

    loop {
        let read = reader
            .read(&mut buf)
            .map_err(|e| BackupError::io("fingerprint.read", path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(Fingerprint(format!("{:x}", hasher.finalize())))
}
