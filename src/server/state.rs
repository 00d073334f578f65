//! Shared application state

use crate::email::EmailClient;
use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::middleware::RateLimits;
use crate::nppes::NppesClient;
use crate::server::config::AppConfig;
use aegis_core::auth::AuthStore;
use aegis_core::documents::DocumentStore;
use aegis_core::rate_limit::FixedWindowLimiter;
use aegis_core::usage::{SqliteUsageStore, UsageTracker};
use aegis_llm::{OpenAiClient, OpenAiConfig};
use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything handlers need, shared via `Extension`
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Users, sessions and reset tokens
    pub auth: Arc<AuthStore>,
    /// Documents and retrieval chunks
    pub documents: Arc<DocumentStore>,
    /// API usage accounting
    pub usage: Arc<UsageTracker>,
    /// Fixed-window rate limiter
    pub limiter: Arc<FixedWindowLimiter>,
    /// Per-tier rate limit configs
    pub limits: Arc<RateLimits>,
    /// LLM API client
    pub llm: Arc<OpenAiClient>,
    /// Transactional e-mail client
    pub email: Arc<EmailClient>,
    /// NPI registry client
    pub nppes: Arc<NppesClient>,
    /// Document text extraction seam
    pub extractor: Arc<dyn TextExtractor>,
}

impl AppState {
    /// Build state from configuration: connect the database, initialize
    /// every store, construct the outbound clients.
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        let pool = connect(&config.database_path).await?;
        Self::with_pool(config, pool, Arc::new(PlainTextExtractor)).await
    }

    /// Build state over an existing pool and extractor (tests)
    pub async fn with_pool(
        config: AppConfig,
        pool: SqlitePool,
        extractor: Arc<dyn TextExtractor>,
    ) -> anyhow::Result<Self> {
        let auth = AuthStore::new(pool.clone(), config.admin_emails.clone())
            .await
            .context("failed to initialize auth store")?;
        let documents = DocumentStore::new(pool.clone())
            .await
            .context("failed to initialize document store")?;
        let usage_store = SqliteUsageStore::new(pool)
            .await
            .context("failed to initialize usage store")?;

        let usage = UsageTracker::new(Arc::new(usage_store))
            .with_alert_threshold(config.daily_alert_threshold_cents);

        let limits = RateLimits::from_settings(&config.rate_limits)
            .context("invalid rate limit settings")?;

        // The client is built either way; without a key every AI feature
        // fails at call time, matching how the app degrades in deployments
        // that have not configured the API yet.
        let api_key = config.openai_api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            warn!("OPENAI_API_KEY not set - AI features will not work");
        }
        let llm = OpenAiClient::new(OpenAiConfig::new(api_key))
            .context("failed to build LLM client")?;

        let email = EmailClient::new(config.email_api_key.clone(), config.email_from.clone())?;
        let nppes = NppesClient::new()?;

        info!("application state initialized");
        Ok(Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            documents: Arc::new(documents),
            usage: Arc::new(usage),
            limiter: Arc::new(FixedWindowLimiter::new()),
            limits: Arc::new(limits),
            llm: Arc::new(llm),
            email: Arc::new(email),
            nppes: Arc::new(nppes),
            extractor,
        })
    }
}

/// Open the SQLite database, creating it if missing
async fn connect(path: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{path}"))
        .with_context(|| format!("invalid database path: {path}"))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    // In-memory databases exist per connection; keep exactly one
    let max_connections = if path == ":memory:" { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("failed to connect to SQLite")?;

    info!(path = %path, "database connected");
    Ok(pool)
}
