//! Client-local durable storage.
//!
//! The cart and session survive a restart by being written as JSON blobs
//! under fixed keys, the way a browser storefront would use `localStorage`.
//! Blobs are unversioned; readers must tolerate or discard old shapes
//! rather than fail.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Fixed keys for persisted blobs.
pub mod keys {
    /// Key for the serialized cart lines.
    pub const CART: &str = "cart";

    /// Key for the persisted session record.
    pub const SESSION: &str = "session";

    /// Key for the auth token issued at login.
    pub const AUTH_TOKEN: &str = "auth_token";
}

/// Errors that can occur reading or writing persisted blobs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage key contains characters unsafe for a filename.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A durable string-blob store keyed by fixed names.
///
/// There is exactly one writer (the UI thread), so implementations do not
/// need any coordination beyond last-write-wins.
pub trait KeyValueStore {
    /// Read the blob under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium fails. Absence is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the blob under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the blob under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: one JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys come from the fixed `keys` module, but reject separators in
        // case a caller passes something else.
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<std::collections::HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blobs = self.blobs.lock().map_or_else(
            |poisoned| poisoned.into_inner().get(key).cloned(),
            |guard| guard.get(key).cloned(),
        );
        Ok(blobs)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }
}
