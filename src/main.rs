//! chatrelayd - line-oriented text chat relay daemon.

use chatrelayd::config::Config;
use chatrelayd::network::Gateway;
use chatrelayd::reaper;
use chatrelayd::state::Registry;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration: defaults, optional file, environment, then argv
    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Failed to load config");
        e
    })?;

    info!(
        address = %config.listen.address(),
        max_line_len = config.limits.max_line_len,
        send_queue = config.limits.send_queue,
        idle_reaper = config.idle.enabled,
        "Starting chatrelayd"
    );

    let registry = Arc::new(Registry::new());

    // Start idle reaper (no-op unless enabled)
    let _reaper = reaper::spawn(Arc::clone(&registry), &config.idle);

    let gateway = Gateway::bind(&config, Arc::clone(&registry)).await?;

    gateway
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
            info!("Ctrl-C received");
        })
        .await?;

    info!("chatrelayd stopped");
    Ok(())
}
