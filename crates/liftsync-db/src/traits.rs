use async_trait::async_trait;

use crate::error::DbResult;

/// Persistent string key/value store, the platform storage primitive.
///
/// Values are whole serialized documents; there are no partial or field-level
/// writes. Uses `async-trait` for object safety (`dyn KeyValueStore`).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value under `key`. A missing key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Replace the value under `key` in one call.
    async fn set(&self, key: &str, value: String) -> DbResult<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> DbResult<()>;
}
