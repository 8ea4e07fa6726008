//! # chatrelay-proto
//!
//! Wire protocol for the chatrelay daemon: a plain-text, newline-terminated
//! line protocol where every line is either one client command or one server
//! reply.
//!
//! ## Features
//!
//! - [`LineCodec`]: a Tokio codec that frames a byte stream into lines, with a
//!   hard cap on line length
//! - [`Command`]: typed client commands parsed from a single line
//! - [`Reply`]: typed server replies, serialized through `Display`
//!
//! ## Quick Start
//!
//! ```rust
//! use chatrelay_proto::{Command, Reply};
//!
//! let cmd: Command = "DM bob see you at noon".parse().unwrap();
//! assert_eq!(
//!     cmd,
//!     Command::Dm { target: "bob".into(), text: "see you at noon".into() }
//! );
//!
//! let relay = Reply::Dm { from: "alice".into(), text: "see you at noon".into() };
//! assert_eq!(relay.to_string(), "DM alice see you at noon");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod reply;

pub use self::command::Command;
pub use self::error::{ParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::reply::{ErrorCode, Reply};

/// Default maximum accepted line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;
