//! Client-side key-value persistence
//!
//! Seen-post history and settings survive reloads as JSON strings under
//! fixed keys. LocalStorage on the web, an in-memory map elsewhere. Missing
//! or unreadable entries fall back to defaults; there is no versioning.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Process-local store (native runs and tests)
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("LocalStorage write failed for {}", key);
            }
        }
    }
}

/// Read and decode a JSON entry; `None` if absent or unreadable
pub fn load_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = kv.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {} entry: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON entry
pub fn save_json<T: Serialize>(kv: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => kv.set(key, &json),
        Err(e) => log::warn!("Could not encode {}: {}", key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip_through_kv() {
        let kv = MemoryKv::new();
        save_json(&kv, "numbers", &vec![1, 2, 3]);
        assert_eq!(load_json::<Vec<i32>>(&kv, "numbers"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_corrupt_entry_is_ignored() {
        let kv = MemoryKv::new();
        kv.set("numbers", "{not json");
        assert_eq!(load_json::<Vec<i32>>(&kv, "numbers"), None);
        assert_eq!(kv.get("missing"), None);
    }
}
