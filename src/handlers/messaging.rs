//! Messaging handlers.
//!
//! Handles MSG (broadcast) and DM (direct) commands.

use super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use chatrelay_proto::{Command, Reply};
use tracing::debug;

/// Handler for MSG command.
///
/// Relays `MSG <sender> <text>` to every other logged-in user. The sender
/// gets no reply. An empty body is relayed as-is.
pub struct MsgHandler;

#[async_trait]
impl Handler for MsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Msg { text } = cmd else {
            return Err(HandlerError::Internal(format!("MSG handler got {}", cmd.name())));
        };
        let from = ctx.username()?;

        ctx.router.broadcast(
            Reply::Msg {
                from: from.to_string(),
                text: text.clone(),
            },
            Some(from),
        );
        Ok(())
    }
}

/// Handler for DM command.
pub struct DmHandler;

#[async_trait]
impl Handler for DmHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Dm { target, text } = cmd else {
            return Err(HandlerError::Internal(format!("DM handler got {}", cmd.name())));
        };
        let from = ctx.username()?;

        ctx.router.direct_message(from, target, text)?;
        debug!(from = %from, to = %target, "direct message relayed");
        Ok(())
    }
}
