//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!    ┌───────────────────────────────────────────────────┐
//!    │              Connection Task                      │
//!    │                                                   │
//!    │  ┌─────────────────┐       ┌──────────────────┐   │
//!    │  │   FramedRead    │       │   FramedWrite    │   │
//!    │  └────────┬────────┘       └────────▲─────────┘   │
//!    │           │                         │             │
//!    │           ▼                         │             │
//!    │    tokio::select! ──▶ [Handlers] ───┤             │
//!    │       ▲      ▲                      │             │
//!    │       │      └── relayed queue ─────┘             │
//!    │       └── kill switch                             │
//!    └───────────────────────────────────────────────────┘
//! ```
//!
//! Lines relayed by other sessions arrive on a bounded queue and are written
//! by this task, so every write to the socket comes from one place.

mod error_handling;
mod event_loop;

use chatrelay_proto::{LineCodec, Reply};
use futures_util::SinkExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Span, debug, info, instrument};

use crate::config::LimitsConfig;
use crate::handlers::{Dispatcher, ReplySink};
use crate::routing::Router;
use crate::state::{DisconnectReason, Registry, Session, SessionHandle};
use event_loop::LoopParts;

/// How long a closing connection may spend flushing to its peer.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// A client connection handler.
pub struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
    limits: LimitsConfig,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        registry: Arc<Registry>,
        dispatcher: Arc<Dispatcher>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            stream,
            addr,
            registry,
            dispatcher,
            limits,
        }
    }

    /// Serve the client until it disconnects or is disconnected.
    #[instrument(skip(self), fields(addr = %self.addr, session = tracing::field::Empty), name = "connection")]
    pub async fn run(self) -> DisconnectReason {
        let Self {
            stream,
            addr,
            registry,
            dispatcher,
            limits,
        } = self;

        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, LineCodec::with_max_len(limits.max_line_len));
        let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(write_half);
        let mut sink: ReplySink = FramedWrite::new(writer, LineCodec::with_max_len(limits.max_line_len));

        let (tx, mut relayed) = mpsc::channel(limits.send_queue.max(1));
        let id = registry.next_session_id();
        Span::current().record("session", id);

        let handle = Arc::new(SessionHandle::new(id, addr, tx));
        registry.track(Arc::clone(&handle));
        let mut session = Session::new(handle);
        let router = Router::new(Arc::clone(&registry));

        let reason = if let Err(e) = sink.send(Reply::Welcome).await {
            debug!(error = %e, "failed to send greeting");
            DisconnectReason::WriteError
        } else {
            event_loop::run(LoopParts {
                session: &mut session,
                router: &router,
                dispatcher: &dispatcher,
                reader: &mut reader,
                sink: &mut sink,
                relayed: &mut relayed,
            })
            .await
        };

        cleanup(&mut session, &registry, &router, reason);

        // Flush anything still buffered and shut down the write half. A peer
        // that stopped reading gets a bounded grace period.
        let _ = tokio::time::timeout(CLOSE_GRACE, SinkExt::<Reply>::close(&mut sink)).await;
        reason
    }
}

/// Leave the registry and tell the remaining users, at most once per session.
fn cleanup(session: &mut Session, registry: &Registry, router: &Router, reason: DisconnectReason) {
    let id = session.id();
    registry.untrack(id);

    let Some(username) = session.close() else {
        return;
    };
    if registry.remove(&username, id) {
        info!(username = %username, %reason, "user disconnected");
        router.announce_departure(&username);
    }
}
