//! Server assembly: configuration, state and the serve loop

pub mod config;
pub mod state;

use crate::api;
use tracing::info;

pub use config::AppConfig;
pub use state::AppState;

/// Run the server until shutdown
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let state = AppState::initialize(config).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Aegis server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
