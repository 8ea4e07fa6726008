//! Unified error handling for chatrelayd.
//!
//! Protocol errors are recoverable and become an `ERR <code>` reply; the
//! connection stays open. Transport errors are fatal to the one connection
//! that raised them and never reach the reply path.

use chatrelay_proto::{ErrorCode, ParseError, ProtocolError, Reply};
use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("username in use: {0}")]
    UsernameTaken(String),

    #[error("bad username: {0:?}")]
    BadUsername(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("no such user: {0:?}")]
    NoSuchUser(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Writing a reply to this session's own connection failed.
    #[error("send error: {0}")]
    Send(#[from] ProtocolError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UsernameTaken(_) => "username_taken",
            Self::BadUsername(_) => "bad_username",
            Self::NotLoggedIn => "not_logged_in",
            Self::AlreadyLoggedIn => "already_logged_in",
            Self::NoSuchUser(_) => "no_such_user",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Send(_) => "send_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Convert to the reply sent back to the client.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_reply(&self) -> Option<Reply> {
        let code = match self {
            Self::UsernameTaken(_) => ErrorCode::UsernameTaken,
            Self::BadUsername(_) => ErrorCode::BadUsername,
            Self::NotLoggedIn => ErrorCode::NotLoggedIn,
            Self::AlreadyLoggedIn => ErrorCode::AlreadyLoggedIn,
            Self::NoSuchUser(_) => ErrorCode::NoSuchUser,
            Self::UnknownCommand(_) => ErrorCode::UnknownCommand,

            // These errors don't get client-visible replies
            Self::Send(_) => return None,
            Self::Internal(_) => return None,
        };
        Some(Reply::Err(code))
    }

    /// Whether the connection that raised this error must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Send(_))
    }
}

impl From<ParseError> for HandlerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::BadUsername(name) => Self::BadUsername(name),
            // An absent target can never name a logged-in user.
            ParseError::MissingTarget => Self::NoSuchUser(String::new()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_map_to_wire_codes() {
        let cases = [
            (HandlerError::UsernameTaken("a".into()), "ERR username-taken"),
            (HandlerError::BadUsername(String::new()), "ERR bad-username"),
            (HandlerError::NotLoggedIn, "ERR not-logged-in"),
            (HandlerError::AlreadyLoggedIn, "ERR already-logged-in"),
            (HandlerError::NoSuchUser("zed".into()), "ERR no-such-user"),
            (HandlerError::UnknownCommand("JOIN".into()), "ERR unknown-command"),
        ];
        for (err, wire) in cases {
            assert_eq!(err.to_reply().unwrap().to_string(), wire);
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn send_errors_are_silent_and_fatal() {
        let err = HandlerError::from(ProtocolError::Io(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        )));
        assert!(err.to_reply().is_none());
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "send_error");
    }

    #[test]
    fn parse_errors_convert() {
        assert!(matches!(
            HandlerError::from(ParseError::BadUsername("a b".into())),
            HandlerError::BadUsername(name) if name == "a b"
        ));
        assert!(matches!(
            HandlerError::from(ParseError::MissingTarget),
            HandlerError::NoSuchUser(_)
        ));
    }
}
