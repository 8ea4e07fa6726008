//! Idle reaper integration tests.

mod common;

use chatrelay_proto::Reply;
use chatrelayd::config::{Config, IdleConfig};
use common::{TestClient, TestServer};
use std::time::Duration;

fn reaper_config() -> Config {
    Config {
        idle: IdleConfig {
            enabled: true,
            timeout: 1,
            interval: 1,
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_idle_session_is_reaped_and_announced() {
    let server = TestServer::spawn_with(reaper_config()).await.unwrap();
    let addr = server.address();
    let mut idle = TestClient::login_as(&addr, "idle").await.unwrap();
    let mut active = TestClient::login_as(&addr, "active").await.unwrap();

    // Stay active by pinging until the departure notice shows up.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let mut announced = false;
    while !announced {
        assert!(
            tokio::time::Instant::now() < deadline,
            "idle session was never reaped"
        );
        tokio::time::sleep(Duration::from_millis(250)).await;
        for reply in active.sync().await.unwrap() {
            assert_eq!(reply, Reply::Disconnected("idle".into()));
            announced = true;
        }
    }

    idle.expect_closed(0).await.unwrap();
    assert_eq!(active.who().await.unwrap(), vec!["active"]);
}

#[tokio::test]
async fn test_disabled_reaper_leaves_idle_sessions() {
    let server = TestServer::spawn().await.unwrap();
    let addr = server.address();
    let mut alice = TestClient::login_as(&addr, "alice").await.unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(alice.who().await.unwrap(), vec!["alice"]);
}
