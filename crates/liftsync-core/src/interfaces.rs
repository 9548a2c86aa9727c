//! Contracts between the workout engine and its platform collaborators.
//!
//! The engine never talks to the network stack or the auth flow directly;
//! it asks these traits and branches on the answer.

#[cfg(any(test, feature = "test-utils"))]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

/// Online/offline oracle.
///
/// Only used to choose between "push now" and "queue for later". Implementations
/// must not retry or back off; retry cadence belongs to the caller.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Connectivity gate with a fixed, switchable answer.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Connectivity for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// An authenticated user session, treated as opaque by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// Supplies the current session, if any. Remote writes are skipped without one.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;
}

/// Session provider backed by a fixed user id (empty = signed out).
#[derive(Debug, Clone)]
pub struct StaticSession {
    user_id: String,
}

impl StaticSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl SessionProvider for StaticSession {
    fn current_session(&self) -> Option<Session> {
        if self.user_id.is_empty() {
            None
        } else {
            Some(Session {
                user_id: self.user_id.clone(),
            })
        }
    }
}
