//! Shared server state.
//!
//! Contains the [`Registry`] of live sessions and the per-connection
//! [`Session`] state machine.

mod dashmap_ext;
mod registry;
mod session;
mod uid;

pub use registry::{Registry, RegistryError};
pub use session::{DeliveryError, DisconnectReason, Session, SessionHandle, SessionState};
pub use uid::{SessionId, SessionIdGenerator};
