//! User query handlers: WHO

use super::{Context, Handler, HandlerResult};
use async_trait::async_trait;
use chatrelay_proto::Command;

/// Handler for WHO command.
///
/// Replies with one `USER <name>` line per logged-in user and no terminator.
/// Order follows the registry and is unspecified.
pub struct WhoHandler;

#[async_trait]
impl Handler for WhoHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command) -> HandlerResult {
        let users = ctx.router.who();
        ctx.reply_all(users).await
    }
}
