//! Chat command handlers.
//!
//! This module contains the Handler trait and the dispatcher that routes
//! parsed client commands to the handler for their verb.

mod connection;
mod core;
mod messaging;
mod user_query;

pub use self::core::{Context, Dispatcher, Handler, ReplySink};
pub use crate::error::{HandlerError, HandlerResult};

pub use connection::{LoginHandler, PingHandler};
pub use messaging::{DmHandler, MsgHandler};
pub use user_query::WhoHandler;
