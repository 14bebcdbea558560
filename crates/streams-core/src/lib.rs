pub mod channels;
pub mod dms;
pub mod error;
pub mod messaging;
pub mod model;
pub mod notifications;
pub mod scheduler;
pub mod standup;
pub mod stats;
pub mod store;
pub mod users;

use std::sync::{Mutex, MutexGuard};

pub use error::{CoreError, Result};
pub use store::Store;

/// Seconds since the epoch, floored. Every timestamp the service records
/// goes through here.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The process-wide state holder: one `Store` behind one coarse lock.
/// HTTP handlers and timer callbacks serialize on it for the duration of
/// their read-modify-write region and release it before responding.
pub struct Streams {
    store: Mutex<Store>,
}

impl Streams {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::new()),
        }
    }

    /// Acquire the store lock. A poisoned lock is recovered: every operation
    /// validates its targets before mutating, so a half-finished panic leaves
    /// no entry point into torn state.
    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Streams {
    fn default() -> Self {
        Self::new()
    }
}
