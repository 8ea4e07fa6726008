//! Server replies.
//!
//! Every reply is a single line. `Display` produces the wire form without the
//! terminator; [`LineCodec`](crate::LineCodec) appends it. `FromStr` is the
//! inverse and exists for clients and test harnesses.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

const WELCOME_TEXT: &str = "Welcome! Please login with: LOGIN <username>";
const DISCONNECTED_SUFFIX: &str = " disconnected";

/// Error codes carried by `ERR <code>` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Another session already holds the requested username.
    UsernameTaken,
    /// Username empty or containing whitespace.
    BadUsername,
    /// Command other than `LOGIN` before login.
    NotLoggedIn,
    /// `LOGIN` after a successful login.
    AlreadyLoggedIn,
    /// `DM` target is not logged in.
    NoSuchUser,
    /// Unknown verb from a logged-in session.
    UnknownCommand,
    /// Input line exceeded the server limit; the connection is closed next.
    LineTooLong,
}

impl ErrorCode {
    /// Wire spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsernameTaken => "username-taken",
            Self::BadUsername => "bad-username",
            Self::NotLoggedIn => "not-logged-in",
            Self::AlreadyLoggedIn => "already-logged-in",
            Self::NoSuchUser => "no-such-user",
            Self::UnknownCommand => "unknown-command",
            Self::LineTooLong => "line-too-long",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "username-taken" => Self::UsernameTaken,
            "bad-username" => Self::BadUsername,
            "not-logged-in" => Self::NotLoggedIn,
            "already-logged-in" => Self::AlreadyLoggedIn,
            "no-such-user" => Self::NoSuchUser,
            "unknown-command" => Self::UnknownCommand,
            "line-too-long" => Self::LineTooLong,
            other => return Err(ParseError::InvalidReply(format!("ERR {other}"))),
        })
    }
}

/// A line sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Greeting sent as soon as a connection is accepted.
    Welcome,
    /// Login accepted.
    Ok,
    /// Recoverable protocol error.
    Err(ErrorCode),
    /// Broadcast relay: `MSG <from> <text>`.
    Msg {
        /// Sender username.
        from: String,
        /// Message body, possibly empty.
        text: String,
    },
    /// Private relay: `DM <from> <text>`.
    Dm {
        /// Sender username.
        from: String,
        /// Message body, possibly empty.
        text: String,
    },
    /// One line of a `WHO` listing: `USER <name>`.
    User(String),
    /// Answer to `PING`.
    Pong,
    /// Departure notice: `INFO <username> disconnected`.
    Disconnected(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str(WELCOME_TEXT),
            Self::Ok => f.write_str("OK"),
            Self::Err(code) => write!(f, "ERR {code}"),
            Self::Msg { from, text } => write!(f, "MSG {from} {text}"),
            Self::Dm { from, text } => write!(f, "DM {from} {text}"),
            Self::User(name) => write!(f, "USER {name}"),
            Self::Pong => f.write_str("PONG"),
            Self::Disconnected(name) => write!(f, "INFO {name}{DISCONNECTED_SUFFIX}"),
        }
    }
}

impl FromStr for Reply {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidReply(s.to_string());

        match s {
            WELCOME_TEXT => return Ok(Self::Welcome),
            "OK" => return Ok(Self::Ok),
            "PONG" => return Ok(Self::Pong),
            _ => {}
        }

        let (verb, rest) = s.split_once(' ').ok_or_else(invalid)?;
        match verb {
            "ERR" => rest.parse().map(Reply::Err),
            "MSG" | "DM" => {
                let (from, text) = rest.split_once(' ').unwrap_or((rest, ""));
                let (from, text) = (from.to_string(), text.to_string());
                Ok(if verb == "MSG" {
                    Self::Msg { from, text }
                } else {
                    Self::Dm { from, text }
                })
            }
            "USER" => Ok(Self::User(rest.to_string())),
            "INFO" => rest
                .strip_suffix(DISCONNECTED_SUFFIX)
                .map(|name| Self::Disconnected(name.to_string()))
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}
