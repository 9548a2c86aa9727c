pub mod documents;
pub mod error;
pub mod file;
pub mod keys;
pub mod schema;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use documents::{LocalStore, StoredDocument};
pub use error::{DbError, DbResult};
pub use keys::StoreKey;
pub use traits::KeyValueStore;
