//! Per-connection resource limits.

use serde::Deserialize;

use super::defaults::{default_max_line_len, default_send_queue};

/// Per-connection resource limits.
///
/// These bound the memory a single client can pin: one for bytes buffered
/// while waiting for a line terminator, one for relayed lines waiting to be
/// written to a slow reader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Maximum input line length in bytes, terminator included (default: 4096).
    /// A client exceeding it is sent `ERR line-too-long` and disconnected.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Outbound queue capacity per session (default: 256).
    /// A recipient whose queue is full is treated as disconnected.
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            send_queue: default_send_queue(),
        }
    }
}
