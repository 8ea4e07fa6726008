//! Network listener configuration.

use serde::Deserialize;

use super::defaults::{default_host, default_port};

/// Network listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenConfig {
    /// Host or address to bind to (default: "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port (default: 4000). Port 0 asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ListenConfig {
    /// `host:port` form, for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
