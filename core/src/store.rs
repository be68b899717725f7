//! Persisted key/value state the session writes through to.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Named string storage that outlives a single gateway, e.g. browser local
/// storage or a file on disk.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("token", "abc");
        assert_eq!(store.get("token").as_deref(), Some("abc"));
        store.set("token", "def");
        assert_eq!(store.get("token").as_deref(), Some("def"));
        assert_eq!(store.len(), 1);
        store.remove("token");
        assert_eq!(store.get("token"), None);
    }
}
