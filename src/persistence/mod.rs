//! Key/value persistence for cross-session progress
//!
//! Backends:
//! - `MemoryStore`: in-process map (tests, headless runs)
//! - `JsonFileStore`: versioned JSON envelope, written tmp-then-rename
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)

pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::BTreeMap;

use thiserror::Error;

pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes could not be decoded
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("unsupported store version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    /// Backend not reachable (no window, storage disabled, quota)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Integer key/value storage
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written
    fn load_int(&self, key: &str) -> Result<Option<i64>, StoreError>;

    fn store(&mut self, key: &str, value: i64) -> Result<(), StoreError>;

    /// Write several values as one batch.
    ///
    /// The default writes them one by one; backends that can commit a batch
    /// at once override it so a failure leaves none of the values written.
    fn store_all(&mut self, entries: &[(&str, i64)]) -> Result<(), StoreError> {
        for &(key, value) in entries {
            self.store(key, value)?;
        }
        Ok(())
    }
}

/// Volatile store backed by a sorted map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.values.get(key).copied())
    }

    fn store(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        (**self).load_int(key)
    }

    fn store(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        (**self).store(key, value)
    }

    fn store_all(&mut self, entries: &[(&str, i64)]) -> Result<(), StoreError> {
        (**self).store_all(entries)
    }
}
