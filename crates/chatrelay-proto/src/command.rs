//! Client commands.
//!
//! A command is one line of text with its terminator already stripped. The
//! first whitespace-delimited token selects the command, case-sensitively;
//! the rest of the line is interpreted per command.
//!
//! | Line                     | Parsed as                               |
//! |--------------------------|-----------------------------------------|
//! | `LOGIN <username>`       | [`Command::Login`]                      |
//! | `MSG <text>`             | [`Command::Msg`]                        |
//! | `DM <username> <text>`   | [`Command::Dm`]                         |
//! | `WHO`                    | [`Command::Who`] (arguments ignored)    |
//! | `PING`                   | [`Command::Ping`] (arguments ignored)   |
//! | anything else            | [`Command::Unrecognized`]               |

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `LOGIN <name>`: claim a username for this connection.
    Login {
        /// Requested username, trimmed, non-empty, no inner whitespace.
        name: String,
    },
    /// `MSG <text>`: broadcast to every other logged-in user.
    Msg {
        /// Everything after the first space; may be empty.
        text: String,
    },
    /// `DM <target> <text>`: deliver privately to one user.
    Dm {
        /// Recipient username.
        target: String,
        /// Everything after the target; may be empty.
        text: String,
    },
    /// `WHO`: list logged-in users.
    Who,
    /// `PING`: liveness probe.
    Ping,
    /// Unknown verb. Holds the verb as sent; empty for a blank line.
    Unrecognized(String),
}

impl Command {
    /// Parse one line into a command.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_start();
        if line.is_empty() {
            return Ok(Self::Unrecognized(String::new()));
        }

        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match verb {
            "LOGIN" => {
                let name = rest.trim();
                if name.is_empty() || name.contains(char::is_whitespace) {
                    return Err(ParseError::BadUsername(name.to_string()));
                }
                Ok(Self::Login {
                    name: name.to_string(),
                })
            }
            "MSG" => Ok(Self::Msg {
                text: rest.to_string(),
            }),
            "DM" => {
                let rest = rest.trim_start();
                if rest.is_empty() {
                    return Err(ParseError::MissingTarget);
                }
                let (target, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Ok(Self::Dm {
                    target: target.to_string(),
                    text: text.to_string(),
                })
            }
            "WHO" => Ok(Self::Who),
            "PING" => Ok(Self::Ping),
            other => Ok(Self::Unrecognized(other.to_string())),
        }
    }

    /// Wire name of the command, for logging and dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "LOGIN",
            Self::Msg { .. } => "MSG",
            Self::Dm { .. } => "DM",
            Self::Who => "WHO",
            Self::Ping => "PING",
            Self::Unrecognized(_) => "UNRECOGNIZED",
        }
    }

    /// A blank input line. Blank lines are no-ops.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Unrecognized(verb) if verb.is_empty())
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { name } => write!(f, "LOGIN {name}"),
            Self::Msg { text } => write!(f, "MSG {text}"),
            Self::Dm { target, text } => write!(f, "DM {target} {text}"),
            Self::Who => f.write_str("WHO"),
            Self::Ping => f.write_str("PING"),
            Self::Unrecognized(verb) => f.write_str(verb),
        }
    }
}
