use std::time::Duration;

use anyhow::Result;
use tracing::info;

use cibesphere_api::app::AppState;
use cibesphere_api::config::Config;
use cibesphere_api::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_logging(&config.logging)?;

    info!("Starting CibESphere v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::build(config).await?;

    let session = state.session.hydrate().await;
    match session.user() {
        Some(user) => info!(user_id = %user.id, role = %user.role, "Resumed session"),
        None => info!("No active session"),
    }

    let mut scheduler = state.scheduler();
    scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}
