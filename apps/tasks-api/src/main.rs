use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// Grace period for in-flight requests and the store shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    info!(
        service = %config.app.name,
        version = %config.app.version,
        environment = ?config.environment,
        "Starting task service"
    );

    let state = AppState::connect(config).await?;
    api::tasks::init_indexes(&state).await?;

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router.merge(health_router(state.config.app));

    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &state.config.server, SHUTDOWN_TIMEOUT, async move {
        mongo_client.shutdown().await;
        info!("Task store connections closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Task service stopped with error: {}", e))?;

    Ok(())
}
