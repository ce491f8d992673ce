//! Durable string-keyed storage.
//!
//! The cart and session layers never touch the filesystem directly; they go
//! through [`Storage`], a minimal key-value contract modelled on browser
//! `localStorage`. Two backends are provided:
//!
//! - [`MemoryStorage`] - process-local map, used by tests and embedders
//! - [`FileStorage`] - a single JSON object on disk, rewritten atomically

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The in-memory map could not be serialized.
    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed durable storage.
///
/// Values are opaque strings; callers own their encoding.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a storage backend.
pub type SharedStorage = Arc<dyn Storage>;

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage. Contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared handle to an empty store.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// File-backed storage holding every key in one JSON object.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so readers never observe a half-written document. A missing file reads as
/// empty; an unreadable document is logged and also read as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open storage at `path`, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "Opened file storage");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Storage file is not a JSON object, treating as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        f(&mut entries);
        self.write_entries(&entries)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
