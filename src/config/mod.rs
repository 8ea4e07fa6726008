//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: top-level `Config`, idle reaper settings, and resolution from
//!   file, environment, and command line
//! - [`listen`]: listener address (`ListenConfig`)
//! - [`limits`]: per-connection resource limits (`LimitsConfig`)

mod defaults;
mod limits;
mod listen;
mod types;

pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{CONFIG_ENV, Config, ConfigError, HOST_ENV, IdleConfig, PORT_ENV};
