pub mod error;
pub mod probe;
pub mod rest;
pub mod rows;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{RemoteError, RemoteResult};
pub use probe::HttpConnectivity;
pub use rest::RestRemote;
pub use traits::RemoteDatabase;
