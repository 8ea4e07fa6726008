//! Idle reaper background task.
//!
//! Periodically scans logged-in sessions and disconnects those that have
//! sent nothing for longer than the configured timeout. The reaper only
//! flips the session's kill switch; the connection task runs the normal
//! cleanup (registry removal, departure notice, socket close).

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::IdleConfig;
use crate::state::{DisconnectReason, Registry};

/// Spawn the idle reaper if it is enabled.
pub fn spawn(registry: Arc<Registry>, config: &IdleConfig) -> Option<JoinHandle<()>> {
    if !config.enabled {
        return None;
    }

    let timeout = config.timeout();
    let period = config.interval();
    info!(
        timeout_secs = timeout.as_secs(),
        interval_secs = period.as_secs(),
        "idle reaper started"
    );

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let reaped = reap_idle(&registry, timeout, Instant::now());
            if !reaped.is_empty() {
                debug!(count = reaped.len(), "idle sessions reaped");
            }
        }
    }))
}

/// Disconnect every logged-in session idle for at least `timeout` as of
/// `now`. Returns the usernames that were signalled.
pub fn reap_idle(registry: &Registry, timeout: Duration, now: Instant) -> Vec<String> {
    let mut reaped = Vec::new();

    for (username, handle) in registry.snapshot() {
        if handle.is_closing() {
            continue;
        }
        let idle = handle.idle_for(now);
        if idle >= timeout {
            info!(
                username = %username,
                session = handle.id(),
                idle_secs = idle.as_secs(),
                "disconnecting idle session"
            );
            handle.disconnect(DisconnectReason::IdleTimeout);
            reaped.push(username);
        }
    }

    reaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionHandle;
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    fn login(registry: &Registry, name: &str) -> Arc<SessionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let handle = Arc::new(SessionHandle::new(registry.next_session_id(), peer, tx));
        registry.try_insert(name, Arc::clone(&handle)).unwrap();
        handle
    }

    #[test]
    fn only_sessions_past_the_threshold_are_reaped() {
        let registry = Registry::new();
        let idle = login(&registry, "idle");
        std::thread::sleep(Duration::from_millis(20));
        let busy = login(&registry, "busy");
        busy.touch();

        let now = busy.last_activity();
        let timeout = idle.idle_for(now);
        assert!(timeout > Duration::ZERO);

        assert_eq!(reap_idle(&registry, timeout, now), vec!["idle"]);
        assert_eq!(idle.kill_reason(), Some(DisconnectReason::IdleTimeout));
        assert!(!busy.is_closing());
    }

    #[test]
    fn fresh_sessions_survive() {
        let registry = Registry::new();
        let alice = login(&registry, "alice");

        let reaped = reap_idle(&registry, Duration::from_secs(60), alice.last_activity());
        assert!(reaped.is_empty());
        assert!(!alice.is_closing());
    }

    #[test]
    fn closing_sessions_are_not_reaped_twice() {
        let registry = Registry::new();
        let alice = login(&registry, "alice");
        let later = alice.last_activity() + Duration::from_secs(120);

        assert_eq!(reap_idle(&registry, Duration::from_secs(60), later), vec!["alice"]);
        assert!(reap_idle(&registry, Duration::from_secs(60), later).is_empty());
    }

    #[test]
    fn disabled_reaper_does_not_spawn() {
        let registry = Arc::new(Registry::new());
        assert!(spawn(registry, &IdleConfig::default()).is_none());
    }
}
