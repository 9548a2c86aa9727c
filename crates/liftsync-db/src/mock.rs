//! In-memory mock implementation of KeyValueStore for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{DbError, DbResult};
use crate::traits::KeyValueStore;

/// In-memory KeyValueStore with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    drop_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` return an error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` report success without storing anything.
    pub fn drop_writes(&self, drop: bool) {
        self.drop_writes.store(drop, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw value under `key`, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Seed a raw value, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::WriteFailed(format!("{key}: injected failure")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.drop_writes.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failures() {
        let store = MemoryStore::new();
        store.set("k", "v1".into()).await.unwrap();

        store.fail_writes(true);
        assert!(store.set("k", "v2".into()).await.is_err());
        assert_eq!(store.raw("k").as_deref(), Some("v1"));

        store.fail_writes(false);
        store.drop_writes(true);
        store.set("k", "v3".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));
        assert_eq!(store.write_count(), 2);
    }
}
