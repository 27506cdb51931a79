//! Local filesystem backend
//!
//! Checkpoints are plain JSON files replaced atomically; enumeration walks
//! the directory tree and compares each file's mtime to the cutoff.

use crate::Backend;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tidemark_core::{
    unix_seconds, Checkpoint, ConfigError, Error, FileRecord, FileRef, Location, Result,
};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Local filesystem backend
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn load_checkpoint(&self, location: &Location) -> Result<Checkpoint> {
        let path = local_path(location)?;

        match std::fs::read(path) {
            Ok(bytes) => Checkpoint::decode(&bytes, location.raw()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No checkpoint file, starting from scratch");
                Ok(Checkpoint::NONE)
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn commit_checkpoint(&self, location: &Location, checkpoint: &Checkpoint) -> Result<()> {
        let path = local_path(location)?;
        atomic_write(path, &checkpoint.encode())?;
        info!(path = %path.display(), "Wrote checkpoint file");
        Ok(())
    }

    fn list_new_files(&self, location: &Location, since: f64) -> Result<Vec<FileRecord>> {
        let root = local_path(location)?;
        let files = scan_newer_than(root, since)?;
        debug!(
            root = %root.display(),
            since,
            found = files.len(),
            "Local enumeration complete"
        );
        Ok(files)
    }
}

/// Walk `root` and collect files with mtime strictly greater than `since`
///
/// Directory symlinks are not descended. A symlink to a regular file is
/// reported with the target's mtime; a dangling one is an error.
pub fn scan_newer_than(root: &Path, since: f64) -> Result<Vec<FileRecord>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let file_type = entry.file_type();

        let metadata = if file_type.is_file() {
            entry
                .metadata()
                .map_err(|e| walk_error(entry.path(), e))?
        } else if file_type.is_symlink() {
            let target =
                std::fs::metadata(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            if !target.is_file() {
                continue;
            }
            target
        } else {
            continue;
        };

        let modified = metadata
            .modified()
            .map_err(|e| Error::io(entry.path(), e))?;
        let mtime = unix_seconds(modified);

        if mtime > since {
            files.push(FileRecord::new(FileRef::Local(entry.into_path()), mtime));
        }
    }

    Ok(files)
}

/// Replace `target` with `data` via a synced temp file in the same directory
///
/// Missing parent directories are created.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let parent = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    tmp.write_all(data).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(target).map_err(|e| Error::io(target, e.error))?;

    Ok(())
}

fn local_path(location: &Location) -> Result<&Path> {
    location.local_path().ok_or_else(|| {
        ConfigError::InvalidLocation {
            path: location.raw().to_string(),
            reason: "not a local filesystem path".to_string(),
        }
        .into()
    })
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(fallback));
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    Error::io(path, source)
}
