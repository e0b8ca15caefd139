//! Application state shared across handlers.
//!
//! The readings store is the only shared mutable resource. It sits behind a
//! single mutex; every handler holds the lock only for one O(1) store call,
//! so a slow client never delays other requests.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use weatherverse_store::Store;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The readings store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration the server was started with.
    pub config: Config,
    /// When the state was created.
    pub started_at: OffsetDateTime,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config,
            started_at: OffsetDateTime::now_utc(),
        })
    }

    /// Seconds elapsed since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        (OffsetDateTime::now_utc() - self.started_at)
            .whole_seconds()
            .max(0) as u64
    }
}
