//! Default value functions for configuration.
//!
//! Separated into its own module so serde attributes and `Default` impls
//! share one source of truth.

// =============================================================================
// Listen Defaults
// =============================================================================

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    4000
}

// =============================================================================
// Limit Defaults
// =============================================================================

pub fn default_max_line_len() -> usize {
    chatrelay_proto::DEFAULT_MAX_LINE_LEN
}

pub fn default_send_queue() -> usize {
    256
}

// =============================================================================
// Idle Reaper Defaults
// =============================================================================

pub fn default_idle_timeout() -> u64 {
    60
}

pub fn default_idle_interval() -> u64 {
    5
}
