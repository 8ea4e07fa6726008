//! Error types for the chat protocol library.
//!
//! [`ProtocolError`] covers framing and transport failures, [`ParseError`]
//! covers lines that were framed correctly but do not form a valid command.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Framing and transport errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line (or a partial line still waiting for its terminator) exceeded
    /// the configured maximum.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Bytes buffered when the limit was hit.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}

impl ProtocolError {
    /// Whether this error came from the peer violating the line limit rather
    /// than from the transport itself.
    pub fn is_line_too_long(&self) -> bool {
        matches!(self, Self::LineTooLong { .. })
    }
}

/// A line that names a known command but carries invalid arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `LOGIN` with an empty username or one containing whitespace.
    #[error("bad username: {0:?}")]
    BadUsername(String),

    /// `DM` with no target token.
    #[error("DM requires a target")]
    MissingTarget,

    /// A server line that matches no known reply.
    #[error("invalid reply: {0:?}")]
    InvalidReply(String),
}

impl ParseError {
    /// Static label for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadUsername(_) => "bad_username",
            Self::MissingTarget => "missing_target",
            Self::InvalidReply(_) => "invalid_reply",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_too_long_is_classified() {
        let err = ProtocolError::LineTooLong {
            actual: 5000,
            limit: 4096,
        };
        assert!(err.is_line_too_long());
        assert_eq!(err.to_string(), "line too long: 5000 bytes (limit: 4096)");

        let io = ProtocolError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(!io.is_line_too_long());
    }

    #[test]
    fn parse_error_codes() {
        assert_eq!(
            ParseError::BadUsername(String::new()).error_code(),
            "bad_username"
        );
        assert_eq!(ParseError::MissingTarget.error_code(), "missing_target");
    }
}
