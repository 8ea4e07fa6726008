//! Per-connection session state.
//!
//! A session is split in two:
//!
//! - [`Session`] is owned exclusively by the connection task and carries the
//!   protocol state machine.
//! - [`SessionHandle`] is the shared, reference-counted half other tasks see
//!   through the [`Registry`](super::Registry): the outbound queue, the
//!   activity clock, and the kill switch.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────────────┐  LOGIN (name free)  ┌─────────────────┐
//! │ Unauthenticated │ ──────────────────▶ │  Authenticated  │
//! └────────┬────────┘                     └────────┬────────┘
//!          │  stream end / I/O error / kill        │
//!          └───────────────┬───────────────────────┘
//!                          ▼
//!                   ┌─────────────┐
//!                   │   Closed    │
//!                   └─────────────┘
//! ```

use chatrelay_proto::Reply;
use parking_lot::Mutex;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::uid::SessionId;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed its end of the stream.
    PeerClosed,
    /// Reading from the peer failed.
    ReadError,
    /// Writing to the peer failed.
    WriteError,
    /// The peer sent a line over the configured limit.
    LineTooLong,
    /// The idle reaper found the session inactive past its threshold.
    IdleTimeout,
    /// A relayed message could not be queued for this session.
    SendQueueFull,
    /// The server is shutting down.
    Shutdown,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeerClosed => "peer closed",
            Self::ReadError => "read error",
            Self::WriteError => "write error",
            Self::LineTooLong => "line too long",
            Self::IdleTimeout => "idle timeout",
            Self::SendQueueFull => "send queue full",
            Self::Shutdown => "server shutdown",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relayed line could not be queued for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("send queue full")]
    Full,
    #[error("session closed")]
    Closed,
}

/// Shared half of a session.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    peer: SocketAddr,
    outbound: mpsc::Sender<Arc<Reply>>,
    last_activity: Mutex<Instant>,
    kill: CancellationToken,
    kill_reason: Mutex<Option<DisconnectReason>>,
}

impl SessionHandle {
    pub fn new(id: SessionId, peer: SocketAddr, outbound: mpsc::Sender<Arc<Reply>>) -> Self {
        Self {
            id,
            peer,
            outbound,
            last_activity: Mutex::new(Instant::now()),
            kill: CancellationToken::new(),
            kill_reason: Mutex::new(None),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Queue a line for this session without waiting.
    ///
    /// Lines queued by one caller are written in the order they were queued.
    pub fn deliver(&self, reply: Arc<Reply>) -> Result<(), DeliveryError> {
        self.outbound.try_send(reply).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Record client activity now.
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn last_activity(&self) -> Instant {
        *self.last_activity.lock()
    }

    /// Time since the last recorded activity, as seen at `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity())
    }

    /// Ask the owning connection task to close the session.
    ///
    /// The first reason wins; later calls only re-trigger the already
    /// cancelled token.
    pub fn disconnect(&self, reason: DisconnectReason) {
        {
            let mut slot = self.kill_reason.lock();
            if slot.is_none() {
                *slot = Some(reason);
            }
        }
        self.kill.cancel();
    }

    pub fn kill_reason(&self) -> Option<DisconnectReason> {
        *self.kill_reason.lock()
    }

    pub fn is_closing(&self) -> bool {
        self.kill.is_cancelled()
    }

    /// Resolves once [`disconnect`](Self::disconnect) has been called.
    pub fn killed(&self) -> WaitForCancellationFuture<'_> {
        self.kill.cancelled()
    }
}

/// Protocol state of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { username: String },
    Closed,
}

/// Connection-owned half of a session.
#[derive(Debug)]
pub struct Session {
    handle: Arc<SessionHandle>,
    state: SessionState,
}

impl Session {
    pub fn new(handle: Arc<SessionHandle>) -> Self {
        Self {
            handle,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn id(&self) -> SessionId {
        self.handle.id()
    }

    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.handle
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn username(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated { username } => Some(username),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    /// Unauthenticated → Authenticated. The username is fixed from here on.
    ///
    /// Returns `false` (and changes nothing) from any other state.
    pub fn authenticate(&mut self, username: String) -> bool {
        if self.state != SessionState::Unauthenticated {
            return false;
        }
        self.state = SessionState::Authenticated { username };
        true
    }

    /// Any state → Closed. Returns the username if the session was logged in.
    pub fn close(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Authenticated { username } => Some(username),
            _ => None,
        }
    }
}
