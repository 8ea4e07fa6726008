//! Connection handlers.
//!
//! Handles LOGIN and PING commands.

use super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use chatrelay_proto::{Command, Reply};
use std::sync::Arc;
use tracing::info;

use crate::state::RegistryError;

/// Handler for LOGIN command.
///
/// Claims the username in the registry and moves the session to
/// `Authenticated`. The registry insert is the single point where a login
/// race is decided.
pub struct LoginHandler;

#[async_trait]
impl Handler for LoginHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Login { name } = cmd else {
            return Err(HandlerError::Internal(format!(
                "LOGIN handler got {}",
                cmd.name()
            )));
        };
        if ctx.session.is_authenticated() {
            return Err(HandlerError::AlreadyLoggedIn);
        }

        let handle = Arc::clone(ctx.session.handle());
        ctx.registry()
            .try_insert(name, handle)
            .map_err(|RegistryError::Taken(taken)| HandlerError::UsernameTaken(taken))?;
        ctx.session.authenticate(name.clone());

        info!(
            session = ctx.session.id(),
            peer = %ctx.session.handle().peer(),
            username = %name,
            "user logged in"
        );

        ctx.reply(Reply::Ok).await
    }
}

/// Handler for PING command.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command) -> HandlerResult {
        ctx.reply(Reply::Pong).await
    }
}
