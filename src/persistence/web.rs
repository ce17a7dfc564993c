//! Browser LocalStorage backend

use super::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("local storage disabled".into()))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn load_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let raw = Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        match raw {
            Some(text) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| StoreError::Corrupt(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    fn store(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, &value.to_string())
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
