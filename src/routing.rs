//! Message fan-out to logged-in users.
//!
//! Every delivery is a non-blocking enqueue onto the recipient's outbound
//! queue. A recipient whose queue is full is disconnected rather than
//! allowed to stall the sender.

use chatrelay_proto::Reply;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::HandlerError;
use crate::state::{DeliveryError, DisconnectReason, Registry, SessionHandle};

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<Registry>,
}

impl Router {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Send `reply` to every logged-in user except `exclude`.
    ///
    /// Recipients are taken from one registry snapshot. A user who logs in
    /// after the snapshot does not receive this line.
    pub fn broadcast(&self, reply: Reply, exclude: Option<&str>) -> BroadcastReport {
        let reply = Arc::new(reply);
        let mut report = BroadcastReport::default();

        for (name, handle) in self.registry.snapshot() {
            if exclude == Some(name.as_str()) {
                continue;
            }
            if deliver(&name, &handle, Arc::clone(&reply)) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        debug!(
            delivered = report.delivered,
            failed = report.failed,
            "broadcast"
        );
        report
    }

    /// Deliver `DM <from> <text>` to `target` only.
    pub fn direct_message(&self, from: &str, target: &str, text: &str) -> Result<(), HandlerError> {
        let handle = self
            .registry
            .get(target)
            .ok_or_else(|| HandlerError::NoSuchUser(target.to_string()))?;

        let reply = Arc::new(Reply::Dm {
            from: from.to_string(),
            text: text.to_string(),
        });
        // A recipient that vanished between lookup and enqueue is not the
        // sender's error; the departure notice tells them.
        deliver(target, &handle, reply);
        Ok(())
    }

    /// One `USER <name>` line per logged-in user.
    pub fn who(&self) -> Vec<Reply> {
        self.registry
            .usernames()
            .into_iter()
            .map(Reply::User)
            .collect()
    }

    /// Tell everyone still logged in that `username` has left.
    pub fn announce_departure(&self, username: &str) -> BroadcastReport {
        self.broadcast(Reply::Disconnected(username.to_string()), None)
    }
}

fn deliver(name: &str, handle: &SessionHandle, reply: Arc<Reply>) -> bool {
    match handle.deliver(reply) {
        Ok(()) => true,
        Err(DeliveryError::Full) => {
            warn!(user = %name, session = handle.id(), "send queue full, disconnecting");
            handle.disconnect(DisconnectReason::SendQueueFull);
            false
        }
        Err(DeliveryError::Closed) => false,
    }
}
