pub mod config;
pub mod interfaces;
pub mod lifecycle;

pub use config::AppConfig;
pub use interfaces::{Connectivity, Session, SessionProvider, StaticSession};
#[cfg(any(test, feature = "test-utils"))]
pub use interfaces::StaticConnectivity;
