//! Scan directory fixtures

use anyhow::Result;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary data root plus a checkpoint path beside it
pub struct ScanDir {
    temp_dir: TempDir,
    data: PathBuf,
    checkpoint: PathBuf,
}

impl ScanDir {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let data = temp_dir.path().join("data");
        fs::create_dir_all(&data)?;
        let checkpoint = temp_dir.path().join("state").join("checkpoint.json");
        Ok(Self {
            temp_dir,
            data,
            checkpoint,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn data(&self) -> &str {
        self.data.to_str().unwrap()
    }

    pub fn checkpoint(&self) -> &str {
        self.checkpoint.to_str().unwrap()
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint
    }

    /// Write a file under the data root with the given mtime
    pub fn file(&self, name: &str, mtime: i64) -> Result<PathBuf> {
        let path = self.data.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, name)?;
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0))?;
        Ok(path)
    }

    /// Write a file one hour in the future
    pub fn future_file(&self, name: &str) -> Result<PathBuf> {
        let now = FileTime::now().unix_seconds();
        self.file(name, now + 3600)
    }
}
