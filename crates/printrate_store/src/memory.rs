//! In-memory key-value store.
//!
//! Clones share the same map, so a test can hand one clone to a
//! [`SettingsStore`](crate::SettingsStore) and inspect the raw values through
//! another. A simulated failure makes every call return
//! [`StoreError::Unavailable`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

/// Shared in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    /// Simulated failure to return from every call.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.write().insert(key.into(), value.into());
        self
    }

    /// Make every subsequent call fail with `message`.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Stop simulating failure.
    pub fn clear_failure(&self) {
        *self.simulate_failure.write() = None;
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_failure(&self) -> StoreResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(StoreError::Unavailable(msg));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_failure()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_failure()?;
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_failure()?;
        self.entries.write().remove(key);
        Ok(())
    }
}
