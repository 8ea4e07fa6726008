//! Test server management.
//!
//! Runs a chatrelayd gateway inside the test's runtime on an ephemeral port.

use chatrelayd::config::Config;
use chatrelayd::network::Gateway;
use chatrelayd::reaper;
use chatrelayd::state::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A test server instance. Stopped when dropped.
pub struct TestServer {
    addr: SocketAddr,
    registry: Arc<Registry>,
    gateway: JoinHandle<()>,
    reaper: Option<JoinHandle<()>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawn a server with default settings.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(Config::default()).await
    }

    /// Spawn a server with the given configuration. The listen address is
    /// always overridden to `127.0.0.1:0`.
    pub async fn spawn_with(mut config: Config) -> anyhow::Result<Self> {
        config.listen.host = "127.0.0.1".to_string();
        config.listen.port = 0;

        let registry = Arc::new(Registry::new());
        let reaper = reaper::spawn(Arc::clone(&registry), &config.idle);
        let gateway = Gateway::bind(&config, Arc::clone(&registry)).await?;
        let addr = gateway.local_addr()?;

        let gateway = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self {
            addr,
            registry,
            gateway,
            reaper,
        })
    }

    /// Get the server address for clients to connect to.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Wait until `count` users are logged in, or fail after a few seconds.
    pub async fn wait_for_users(&self, count: usize) -> anyhow::Result<()> {
        for _ in 0..100 {
            if self.registry.len() == count {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!(
            "expected {count} users, registry has {}",
            self.registry.len()
        )
    }

    /// Poll until the number of open connections reaches `count`.
    pub async fn wait_for_connections(&self, count: usize) -> anyhow::Result<()> {
        for _ in 0..100 {
            if self.registry.connection_count() == count {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!(
            "expected {count} connections, registry tracks {}",
            self.registry.connection_count()
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.gateway.abort();
        if let Some(reaper) = &self.reaper {
            reaper.abort();
        }
    }
}
