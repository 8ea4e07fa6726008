//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{default_idle_interval, default_idle_timeout};
use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "CHATRELAY_CONFIG";
/// Environment variable overriding the listen host.
pub const HOST_ENV: &str = "CHAT_HOST";
/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "CHAT_PORT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid port {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Per-connection resource limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Idle reaper configuration.
    #[serde(default)]
    pub idle: IdleConfig,
}

impl Config {
    /// Load configuration from a TOML file. Missing sections take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve configuration for the running process.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from explicit arguments and an environment lookup.
    ///
    /// Precedence, lowest to highest: built-in defaults, the file named by
    /// [`CONFIG_ENV`], [`HOST_ENV`] / [`PORT_ENV`], then the first positional
    /// argument as the port.
    pub fn resolve<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match env(CONFIG_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(host) = env(HOST_ENV) {
            config.listen.host = host;
        }
        if let Some(port) = env(PORT_ENV) {
            config.listen.port = parse_port(&port)?;
        }
        if let Some(port) = args.into_iter().next() {
            config.listen.port = parse_port(&port)?;
        }

        Ok(config)
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidPort {
            value: value.to_string(),
            source,
        })
}

/// Idle reaper configuration.
///
/// When enabled, logged-in sessions that send nothing for `timeout` seconds
/// are disconnected. The reaper wakes every `interval` seconds, so a session
/// may linger up to `timeout + interval` before it is removed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdleConfig {
    /// Whether the reaper runs at all (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Seconds of inactivity before disconnect (default: 60).
    #[serde(default = "default_idle_timeout")]
    pub timeout: u64,
    /// Seconds between reaper scans (default: 5).
    #[serde(default = "default_idle_interval")]
    pub interval: u64,
}

impl IdleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: default_idle_timeout(),
            interval: default_idle_interval(),
        }
    }
}
