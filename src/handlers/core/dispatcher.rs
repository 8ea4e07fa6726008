//! Command dispatch.
//!
//! Every non-blank line goes through [`Dispatcher::dispatch_line`], which
//! gates the verb against the session state, parses the line, and runs the
//! matching handler inside a `command` span.

use chatrelay_proto::Command;
use std::collections::HashMap;
use tracing::{Instrument, Level, debug, span};

use super::context::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{DmHandler, LoginHandler, MsgHandler, PingHandler, WhoHandler};
use crate::state::Session;

/// The only verb accepted before login.
const LOGIN: &str = "LOGIN";

/// Table of command handlers keyed by verb.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Dispatcher {
    /// Create a dispatcher with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert(LOGIN, Box::new(LoginHandler));
        handlers.insert("PING", Box::new(PingHandler));

        handlers.insert("MSG", Box::new(MsgHandler));
        handlers.insert("DM", Box::new(DmHandler));

        handlers.insert("WHO", Box::new(WhoHandler));

        Self { handlers }
    }

    /// Handle one non-blank input line.
    pub async fn dispatch_line(&self, ctx: &mut Context<'_>, line: &str) -> HandlerResult {
        let verb = line.split_whitespace().next().unwrap_or_default();
        check_state(ctx.session, verb)?;

        let cmd = Command::parse(line)?;
        self.dispatch(ctx, &cmd).await
    }

    /// Run the handler for an already-parsed command.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, cmd: &Command) -> HandlerResult {
        let Some(handler) = self.handlers.get(cmd.name()) else {
            let verb = match cmd {
                Command::Unrecognized(verb) => verb.clone(),
                other => other.name().to_string(),
            };
            return Err(HandlerError::UnknownCommand(verb));
        };

        let command_span = span!(
            Level::DEBUG,
            "command",
            command = cmd.name(),
            session = ctx.session.id(),
            username = ctx.session.username(),
        );

        let result = handler.handle(ctx, cmd).instrument(command_span).await;
        if let Err(ref e) = result {
            debug!(command = cmd.name(), error = %e, code = e.error_code(), "command error");
        }
        result
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Only LOGIN is valid before login, and only once.
fn check_state(session: &Session, verb: &str) -> HandlerResult {
    match (session.is_authenticated(), verb == LOGIN) {
        (false, false) => Err(HandlerError::NotLoggedIn),
        (true, true) => Err(HandlerError::AlreadyLoggedIn),
        _ => Ok(()),
    }
}
