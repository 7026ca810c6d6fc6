//! Archive builder.
//!
//! Packs a save directory into a gzip-compressed tar file whose only
//! top-level entry is the directory's base name. Output is byte-stable for
//! an unchanged tree:
//! - members are appended in sorted order
//! - tar headers use deterministic mode (fixed mtime, uid/gid, permissions)
//! - flate2 writes no timestamp into the gzip header
//!
//! The archive is written to `<target>.partial` first and renamed into
//! place, so a half-written file never takes the target name.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::HeaderMode;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{BackupError, BackupResult};
use crate::slug::PLACEHOLDER;

/// File extension of every archive this tool produces.
pub const EXTENSION: &str = "tar.gz";

pub fn build(source: &Path, target: &Path) -> BackupResult<()> {
    if !source.is_dir() {
        return Err(BackupError::MissingSource {
            path: source.to_path_buf(),
        });
    }

    // named after the configured path, even when it is a symlink
    let root_name = source.file_name().map(OsStr::to_os_string);
    let source = fs::canonicalize(source)
        .map_err(|e| BackupError::io("archive.canonicalize", source, e))?;
    let root_name = root_name
        .or_else(|| source.file_name().map(OsStr::to_os_string))
        .unwrap_or_else(|| OsString::from(PLACEHOLDER));

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BackupError::io("archive.create_parent", parent, e))?;
    }

    let partial = partial_path(target);
    let file = File::create(&partial)
        .map_err(|e| BackupError::io("archive.create", &partial, e))?;

    let written = write_archive(file, &source, &root_name, &partial).and_then(|members| {
        fs::rename(&partial, target)
            .map(|()| members)
            .map_err(|e| BackupError::io("archive.rename", target, e))
    });
    let members = match written {
        Ok(members) => members,
        Err(e) => {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
    };

    info!("Created {} ({members} entries).", target.display());
    Ok(())
}

/// Streams the sorted tree into `file`. Returns the number of members.
fn write_archive(
    file: File,
    source: &Path,
    root_name: &OsStr,
    partial: &Path,
) -> BackupResult<usize> {
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(HeaderMode::Deterministic);
    builder.follow_symlinks(false);

    let mut members = 0usize;
    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| BackupError::walk("archive.walk", source, e))?;
        let name = member_name(root_name, source, entry.path());
        let file_type = entry.file_type();

        if file_type.is_dir() {
            builder
                .append_dir(&name, entry.path())
                .map_err(|e| BackupError::io("archive.append_dir", entry.path(), e))?;
        } else if file_type.is_file() || file_type.is_symlink() {
            builder
                .append_path_with_name(entry.path(), &name)
                .map_err(|e| BackupError::io("archive.append_file", entry.path(), e))?;
        } else {
            debug!("skipping special file {}", entry.path().display());
            continue;
        }
        members += 1;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| BackupError::io("archive.finish_tar", partial, e))?;
    let mut writer = encoder
        .finish()
        .map_err(|e| BackupError::io("archive.finish_gzip", partial, e))?;
    writer
        .flush()
        .map_err(|e| BackupError::io("archive.flush", partial, e))?;

    Ok(members)
}

fn member_name(root_name: &OsStr, source: &Path, path: &Path) -> PathBuf {
    let root = PathBuf::from(root_name);
    match path.strip_prefix(source) {
        Ok(relative) if !relative.as_os_str().is_empty() => root.join(relative),
        _ => root,
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}
