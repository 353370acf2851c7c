//! File-backed session storage.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::errors::StorageError;
use crate::domain::ports::SessionStoragePort;

/// Key/value items kept in one JSON file, rewritten atomically on every change.
pub struct LocalStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Opens the file at `path`. A missing file starts empty; an unreadable one is
    /// discarded with a warning.
    ///
    /// # Errors
    /// Returns [`StorageError::ReadFailed`] when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| StorageError::ReadFailed(e.to_string()))?;
            match serde_json::from_str(&content) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding corrupt session file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = items.len(), "Session storage opened");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(items).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        let parent = self
            .path
            .parent()
            .ok_or(StorageError::DataDirNotFound)?;
        fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| StorageError::WriteFailed(e.error.to_string()))?;
        Ok(())
    }
}

impl SessionStoragePort for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value.to_string());
        self.persist(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&items)
    }
}
