//! Per-connection read/write loop.

use chatrelay_proto::{LineCodec, ProtocolError, Reply};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tracing::{debug, warn};

use super::error_handling::{
    HandlerErrorAction, ReadErrorAction, classify_handler_error, classify_read_error,
    line_too_long_reply,
};
use crate::handlers::{Context, Dispatcher, ReplySink};
use crate::routing::Router;
use crate::state::{DisconnectReason, Session, SessionHandle};

enum SelectResult {
    /// The session was told to close (reaper, full queue, shutdown)
    Killed,
    /// A line relayed from another session
    Outgoing(Arc<Reply>),
    /// A line from the client
    Incoming(String),
    /// Reading from the client failed
    ReadError(ProtocolError),
    /// The client closed the stream
    Eof,
}

fn kill_reason(handle: &SessionHandle) -> DisconnectReason {
    handle.kill_reason().unwrap_or(DisconnectReason::Shutdown)
}

/// Write one line unless the session is killed first. A peer that stops
/// reading blocks the write; the kill switch must still get through.
async fn write<T>(handle: &SessionHandle, sink: &mut ReplySink, line: T) -> Result<(), DisconnectReason>
where
    T: std::fmt::Display,
{
    tokio::select! {
        biased;
        _ = handle.killed() => Err(kill_reason(handle)),
        sent = sink.send(line) => sent.map_err(|e| {
            debug!(error = %e, "write error");
            DisconnectReason::WriteError
        }),
    }
}

/// Borrowed pieces of one connection the loop drives.
pub(super) struct LoopParts<'a, R> {
    pub session: &'a mut Session,
    pub router: &'a Router,
    pub dispatcher: &'a Dispatcher,
    pub reader: &'a mut FramedRead<R, LineCodec>,
    pub sink: &'a mut ReplySink,
    pub relayed: &'a mut mpsc::Receiver<Arc<Reply>>,
}

/// Run until the connection ends, returning why it ended.
pub(super) async fn run<R>(parts: LoopParts<'_, R>) -> DisconnectReason
where
    R: AsyncRead + Unpin,
{
    let LoopParts {
        session,
        router,
        dispatcher,
        reader,
        sink,
        relayed,
    } = parts;
    let handle = Arc::clone(session.handle());

    loop {
        let select_result = tokio::select! {
            biased;

            _ = handle.killed() => SelectResult::Killed,

            Some(reply) = relayed.recv() => SelectResult::Outgoing(reply),

            frame = reader.next() => match frame {
                Some(Ok(line)) => SelectResult::Incoming(line),
                Some(Err(e)) => SelectResult::ReadError(e),
                None => SelectResult::Eof,
            },
        };

        match select_result {
            SelectResult::Killed => return kill_reason(&handle),

            SelectResult::Outgoing(reply) => {
                if let Err(reason) = write(&handle, sink, reply).await {
                    return reason;
                }
            }

            SelectResult::Incoming(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                handle.touch();

                let result = {
                    let mut ctx = Context::new(session, router, sink);
                    tokio::select! {
                        biased;
                        _ = handle.killed() => return kill_reason(&handle),
                        result = dispatcher.dispatch_line(&mut ctx, &line) => result,
                    }
                };
                let Err(e) = result else {
                    continue;
                };

                match classify_handler_error(&e) {
                    HandlerErrorAction::Reply(reply) => {
                        if let Err(reason) = write(&handle, sink, reply).await {
                            return reason;
                        }
                    }
                    HandlerErrorAction::Ignore => {
                        warn!(error = %e, code = e.error_code(), "command failed");
                    }
                    HandlerErrorAction::Disconnect(reason) => {
                        debug!(error = %e, "handler write failed");
                        return reason;
                    }
                }
            }

            SelectResult::ReadError(e) => match classify_read_error(&e) {
                ReadErrorAction::LineTooLong => {
                    warn!(error = %e, "line too long, disconnecting");
                    // Best effort; the connection closes either way.
                    let _ = write(&handle, sink, line_too_long_reply()).await;
                    return DisconnectReason::LineTooLong;
                }
                ReadErrorAction::IoError => {
                    debug!(error = %e, "read error");
                    return DisconnectReason::ReadError;
                }
            },

            SelectResult::Eof => return DisconnectReason::PeerClosed,
        }
    }
}
