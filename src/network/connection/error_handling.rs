//! Error handling utilities for connection management.
//!
//! Classifies transport and handler errors into what the event loop should
//! do next.

use chatrelay_proto::{ErrorCode, ProtocolError, Reply};

use crate::error::HandlerError;
use crate::state::DisconnectReason;

/// Classification of a framing error for appropriate handling.
#[derive(Debug)]
pub(super) enum ReadErrorAction {
    /// Peer exceeded the line limit - send `ERR line-too-long` and disconnect
    LineTooLong,
    /// I/O error - connection is broken, just log and disconnect
    IoError,
}

pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    if e.is_line_too_long() {
        ReadErrorAction::LineTooLong
    } else {
        ReadErrorAction::IoError
    }
}

/// What to do after a handler failed.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum HandlerErrorAction {
    /// Send this reply and keep reading.
    Reply(Reply),
    /// Nothing to tell the client; keep reading.
    Ignore,
    /// The connection is gone.
    Disconnect(DisconnectReason),
}

pub(super) fn classify_handler_error(e: &HandlerError) -> HandlerErrorAction {
    if e.is_fatal() {
        return HandlerErrorAction::Disconnect(DisconnectReason::WriteError);
    }
    match e.to_reply() {
        Some(reply) => HandlerErrorAction::Reply(reply),
        None => HandlerErrorAction::Ignore,
    }
}

pub(super) fn line_too_long_reply() -> Reply {
    Reply::Err(ErrorCode::LineTooLong)
}
