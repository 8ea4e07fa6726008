//! Core handler infrastructure: the handler context and trait, and the
//! dispatcher that routes parsed commands to handlers.

pub mod context;
pub mod dispatcher;

pub use context::{Context, Handler, ReplySink};
pub use dispatcher::Dispatcher;
