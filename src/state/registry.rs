//! Registry of live sessions and logged-in users.
//!
//! Two maps are kept:
//!
//! - `users`: username → session, the authoritative name table. Guarded by a
//!   single lock so check-and-insert is atomic and snapshots are consistent.
//! - `connections`: session id → session, every accepted connection whether
//!   logged in or not. Used for shutdown and connection counts.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use dashmap::DashMap;

use super::dashmap_ext::DashMapExt;
use super::session::{DisconnectReason, SessionHandle};
use super::uid::{SessionId, SessionIdGenerator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("username in use: {0}")]
    Taken(String),
}

#[derive(Debug, Default)]
pub struct Registry {
    users: RwLock<HashMap<String, Arc<SessionHandle>>>,
    connections: DashMap<SessionId, Arc<SessionHandle>>,
    ids: SessionIdGenerator,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_session_id(&self) -> SessionId {
        self.ids.next()
    }

    // ------------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------------

    pub fn track(&self, handle: Arc<SessionHandle>) {
        self.connections.insert(handle.id(), handle);
    }

    pub fn untrack(&self, id: SessionId) {
        self.connections.remove(&id);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Ask every live connection to close. Returns how many were signalled.
    pub fn disconnect_all(&self, reason: DisconnectReason) -> usize {
        let handles = self.connections.values_cloned();
        for handle in &handles {
            handle.disconnect(reason);
        }
        handles.len()
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Claim `name` for `handle`. Exactly one of any set of concurrent
    /// claimants for the same name succeeds.
    pub fn try_insert(&self, name: &str, handle: Arc<SessionHandle>) -> Result<(), RegistryError> {
        match self.users.write().entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::Taken(name.to_string())),
            Entry::Vacant(slot) => {
                debug!(user = %name, session = handle.id(), "username claimed");
                slot.insert(handle);
                Ok(())
            }
        }
    }

    /// Release `name` if it is still held by session `id`.
    ///
    /// Returns `true` only for the call that actually removed the entry.
    pub fn remove(&self, name: &str, id: SessionId) -> bool {
        let mut users = self.users.write();
        match users.get(name) {
            Some(handle) if handle.id() == id => {
                users.remove(name);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<SessionHandle>> {
        self.users.read().get(name).cloned()
    }

    /// Consistent copy of the user table at one instant.
    pub fn snapshot(&self) -> Vec<(String, Arc<SessionHandle>)> {
        self.users
            .read()
            .iter()
            .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
            .collect()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}
