//! Command handler context and the `Handler` trait.

use async_trait::async_trait;
use chatrelay_proto::{Command, LineCodec, Reply};
use futures_util::SinkExt;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

use crate::error::{HandlerError, HandlerResult};
use crate::routing::Router;
use crate::state::{Registry, Session};

/// Write half of a client connection, framed into lines.
pub type ReplySink = FramedWrite<Box<dyn AsyncWrite + Send + Unpin>, LineCodec>;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// This connection's session.
    pub session: &'a mut Session,
    /// Fan-out to other sessions.
    pub router: &'a Router,
    /// Replies to this session's own commands.
    pub sink: &'a mut ReplySink,
}

impl<'a> Context<'a> {
    pub fn new(session: &'a mut Session, router: &'a Router, sink: &'a mut ReplySink) -> Self {
        Self {
            session,
            router,
            sink,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.router.registry()
    }

    /// The logged-in username, or `NotLoggedIn`.
    pub fn username(&self) -> Result<&str, HandlerError> {
        self.session.username().ok_or(HandlerError::NotLoggedIn)
    }

    /// Send one reply to this client.
    pub async fn reply(&mut self, reply: Reply) -> HandlerResult {
        self.sink.send(reply).await?;
        Ok(())
    }

    /// Send several replies with a single flush.
    pub async fn reply_all(&mut self, replies: Vec<Reply>) -> HandlerResult {
        for reply in replies {
            self.sink.feed(reply).await?;
        }
        SinkExt::<Reply>::flush(&mut *self.sink).await?;
        Ok(())
    }
}

/// A command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command) -> HandlerResult;
}
