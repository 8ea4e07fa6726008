//! Connection identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for one accepted connection.
pub type SessionId = u64;

/// Generates process-unique session IDs.
///
/// IDs are never reused, so a stale reference to a closed session can never
/// be mistaken for a newer session that logged in under the same name.
#[derive(Debug)]
pub struct SessionIdGenerator {
    counter: AtomicU64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next unique ID.
    pub fn next(&self) -> SessionId {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
