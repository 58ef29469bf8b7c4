//! File-backed durable storage.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::{debug, instrument};

use crate::Result;
use crate::error::{Error, StorageError};

use super::StorageBacking;

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Durable backing: a JSON object of string entries in a single file.
///
/// Every mutation is a read-modify-write performed under an exclusive lock
/// on a sibling `.lock` file, and reads take the same lock shared. The file
/// itself is replaced by renaming a fully written temp file over it, so a
/// crash mid-write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct FileBacking {
    path: PathBuf,
}

impl FileBacking {
    /// Use `path` as the backing file. The file and its parent directory
    /// are created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Conventional location inside a data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("session.json"))
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn io_error(&self, err: std::io::Error) -> Error {
        StorageError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
        .into()
    }

    fn lock(&self, exclusive: bool) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;

        if exclusive {
            lock_file.lock_exclusive()
        } else {
            lock_file.lock_shared()
        }
        .map_err(|e| self.io_error(e))?;
        Ok(lock_file)
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let temp_path = self.temp_path();
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut temp = options.open(&temp_path).map_err(|e| self.io_error(e))?;
        // A temp file left over from a crash keeps its old mode.
        #[cfg(unix)]
        temp.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| self.io_error(e))?;
        temp.write_all(json.as_bytes())
            .and_then(|()| temp.sync_all())
            .map_err(|e| self.io_error(e))?;
        drop(temp);

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let lock_file = self.lock(true)?;

        let mut entries = self.load()?;
        if apply(&mut entries) {
            self.persist(&entries)?;
        }

        lock_file.unlock().map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBacking for FileBacking {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock_file = self.lock(false)?;
        let value = self.load()?.remove(key);
        lock_file.unlock().map_err(|e| self.io_error(e))?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!("Writing durable entry");
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
