//! chatrelayd - line-oriented text chat relay.
//!
//! Clients connect over TCP, claim a username with `LOGIN`, and exchange
//! broadcast (`MSG`) and direct (`DM`) messages through this process, which
//! owns all connection state. The wire protocol lives in `chatrelay-proto`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod reaper;
pub mod routing;
pub mod state;
