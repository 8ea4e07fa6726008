//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket and spawns a Connection task for each
//! incoming client. A failed accept is logged and the loop keeps going.

use anyhow::Context as _;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, instrument};

use crate::config::{Config, LimitsConfig};
use crate::handlers::Dispatcher;
use crate::network::Connection;
use crate::state::{DisconnectReason, Registry};

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
    limits: LimitsConfig,
}

impl Gateway {
    /// Bind the gateway to the configured host and port.
    pub async fn bind(config: &Config, registry: Arc<Registry>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((config.listen.host.as_str(), config.listen.port))
            .await
            .with_context(|| format!("failed to bind {}", config.listen.address()))?;
        info!(address = %listener.local_addr()?, "listener bound");

        Ok(Self {
            listener,
            registry,
            dispatcher: Arc::new(Dispatcher::new()),
            limits: config.limits.clone(),
        })
    }

    /// The address actually bound. Useful with port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Accept connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves, then ask every live
    /// session to close.
    #[instrument(skip_all, name = "gateway")]
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    let signalled = self.registry.disconnect_all(DisconnectReason::Shutdown);
                    info!(sessions = signalled, "gateway shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.spawn_connection(stream, addr),
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        info!(
            %addr,
            connections = self.registry.connection_count() + 1,
            "connection accepted"
        );

        let connection = Connection::new(
            stream,
            addr,
            Arc::clone(&self.registry),
            Arc::clone(&self.dispatcher),
            self.limits.clone(),
        );
        tokio::spawn(async move {
            let reason = connection.run().await;
            info!(%addr, %reason, "connection closed");
        });
    }
}
