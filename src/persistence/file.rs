//! JSON file backend
//!
//! The whole store is one versioned envelope. Writes go to a sibling `.tmp`
//! file that is then renamed over the real one, so a crash mid-write leaves
//! the previous save intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StoreError};

/// Current envelope format
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    values: BTreeMap<String, i64>,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let envelope: Envelope =
                    serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))?;
                if envelope.version != STORE_VERSION {
                    return Err(StoreError::UnsupportedVersion {
                        found: envelope.version,
                        expected: STORE_VERSION,
                    });
                }
                log::info!("Loaded {} values from {}", envelope.values.len(), path.display());
                envelope.values
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No store at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let envelope = Envelope {
            version: STORE_VERSION,
            values: self.values.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn load_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.values.get(key).copied())
    }

    fn store(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.store_all(&[(key, value)])
    }

    /// One file replace for the whole batch; memory rolls back on failure
    fn store_all(&mut self, entries: &[(&str, i64)]) -> Result<(), StoreError> {
        let snapshot = self.values.clone();
        for &(key, value) in entries {
            self.values.insert(key.to_string(), value);
        }
        if let Err(e) = self.flush() {
            self.values = snapshot;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup_test_dir() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("save").join("economy.json");
        (dir, path)
    }

    #[test]
    fn test_values_survive_reopen() {
        let (_dir, path) = setup_test_dir();
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.load_int("runner.coins").unwrap(), None);
        store.store("runner.coins", 120).unwrap();
        store.store("runner.high_score", 9001).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.load_int("runner.coins").unwrap(), Some(120));
        assert_eq!(reopened.load_int("runner.high_score").unwrap(), Some(9001));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_failed_batch_writes_nothing() {
        let (_dir, path) = setup_test_dir();
        let mut store = JsonFileStore::open(&path).unwrap();
        store.store("runner.coins", 10).unwrap();

        // A directory in the way of the temp file makes the flush fail
        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        let result = store.store_all(&[("runner.coins", 99), ("runner.gems", 4)]);
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.load_int("runner.coins").unwrap(), Some(10));
        assert_eq!(store.load_int("runner.gems").unwrap(), None);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.load_int("runner.coins").unwrap(), Some(10));
        assert_eq!(reopened.load_int("runner.gems").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let (dir, _) = setup_test_dir();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let (dir, _) = setup_test_dir();
        let path = dir.path().join("future.json");
        std::fs::write(&path, r#"{ "version": 7, "values": {} }"#).unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::UnsupportedVersion { found: 7, expected: 1 })
        ));
    }
}
