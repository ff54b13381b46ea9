//! Browser local storage backend

use iborovi::storage::{KeyValueStore, StorageError, StorageResult};

use crate::js_error_message;

/// `window.localStorage`, when the browser allows it
///
/// Storage can be missing entirely (disabled cookies, some private modes);
/// every operation then fails with `StorageError::Unavailable` and the chat
/// keeps running from memory.
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            crate::warn("localStorage is not available; chat history will not be saved");
        }
        Self { storage }
    }

    fn storage(&self) -> StorageResult<&web_sys::Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage is not available".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage()?.get_item(key).map_err(|e| {
            let message = js_error_message(&e);
            crate::warn(&format!("Could not read {} from localStorage: {}", key, message));
            StorageError::Unavailable(message)
        })
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        // Browsers throw QuotaExceededError here when the origin is full
        self.storage()?.set_item(key, value).map_err(|e| {
            let message = js_error_message(&e);
            crate::warn(&format!("Could not save {} to localStorage: {}", key, message));
            StorageError::Unavailable(message)
        })
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(js_error_message(&e)))
    }
}
