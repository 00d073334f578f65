//! Aegis - healthcare-insurance assistant server
//!
//! Entry point: loads `.env`, initializes logging, runs the server.

#![forbid(unsafe_code)]

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod email;
mod error;
mod extract;
mod middleware;
mod nppes;
mod rag;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegis=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Aegis v{}", env!("CARGO_PKG_VERSION"));
    server::run().await
}
