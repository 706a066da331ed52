use std::collections::HashMap;

use parking_lot::Mutex;

use crate::domain::ports::{SessionStorage, StorageError};

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
