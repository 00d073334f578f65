//! Server configuration
//!
//! Configuration comes from the environment (`.env` is loaded by `main`).
//! Every value has a development-friendly default; only the external API
//! keys are genuinely required for the corresponding features to work.

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind address for the HTTP server
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// SQLite database path (`:memory:` for tests)
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Public base URL, used in e-mail links
    #[serde(default = "default_app_url")]
    pub app_url: String,
    /// OpenAI API key; AI features fail without it
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Email provider API key; transactional e-mail fails without it
    #[serde(default)]
    pub email_api_key: Option<String>,
    /// From address for transactional e-mail
    #[serde(default = "default_email_from")]
    pub email_from: String,
    /// E-mails allowed to use admin endpoints
    #[serde(default)]
    pub admin_emails: Vec<String>,
    /// Daily API spend (USD cents) above which a warning is logged
    #[serde(default = "default_alert_threshold_cents")]
    pub daily_alert_threshold_cents: f64,
    /// Per-operation rate limits
    #[serde(default)]
    pub rate_limits: RateLimitSettings,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_path() -> String {
    "aegis.db".to_string()
}

fn default_app_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_email_from() -> String {
    "noreply@aegis.health".to_string()
}

fn default_alert_threshold_cents() -> f64 {
    200.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_path: default_database_path(),
            app_url: default_app_url(),
            openai_api_key: None,
            email_api_key: None,
            email_from: default_email_from(),
            admin_emails: Vec::new(),
            daily_alert_threshold_cents: default_alert_threshold_cents(),
            rate_limits: RateLimitSettings::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("AEGIS_BIND") {
            config.bind_addr = value;
        }
        if let Ok(value) = std::env::var("AEGIS_DATABASE_PATH") {
            config.database_path = value;
        }
        if let Ok(value) = std::env::var("APP_URL") {
            config.app_url = value;
        }
        config.openai_api_key = std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty());
        config.email_api_key = std::env::var("RESEND_API_KEY").ok().filter(|v| !v.is_empty());
        if let Ok(value) = std::env::var("EMAIL_FROM") {
            config.email_from = value;
        }
        if let Ok(value) = std::env::var("ADMIN_EMAILS") {
            config.admin_emails = parse_email_list(&value);
        }
        if let Ok(value) = std::env::var("OPENAI_DAILY_ALERT_THRESHOLD_CENTS") {
            if let Ok(cents) = value.parse() {
                config.daily_alert_threshold_cents = cents;
            }
        }

        config
    }
}

/// Per-operation rate limit settings.
///
/// Tiers mirror how expensive each route is for us: chat and voice burn
/// LLM tokens, embedding calls are cheap and batched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Chat requests per user per minute
    #[serde(default = "default_chat_per_minute")]
    pub chat_per_minute: u32,
    /// Transcription requests per user per minute
    #[serde(default = "default_transcription_per_minute")]
    pub transcription_per_minute: u32,
    /// Voice requests per user per minute
    #[serde(default = "default_voice_per_minute")]
    pub voice_per_minute: u32,
    /// Embedding requests per user per minute
    #[serde(default = "default_embedding_per_minute")]
    pub embedding_per_minute: u32,
    /// General API requests per user per minute
    #[serde(default = "default_general_per_minute")]
    pub general_per_minute: u32,
    /// Password-reset requests per e-mail per hour
    #[serde(default = "default_password_reset_per_hour")]
    pub password_reset_per_hour: u32,
}

fn default_chat_per_minute() -> u32 {
    20
}
fn default_transcription_per_minute() -> u32 {
    10
}
fn default_voice_per_minute() -> u32 {
    10
}
fn default_embedding_per_minute() -> u32 {
    30
}
fn default_general_per_minute() -> u32 {
    60
}
fn default_password_reset_per_hour() -> u32 {
    3
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            chat_per_minute: default_chat_per_minute(),
            transcription_per_minute: default_transcription_per_minute(),
            voice_per_minute: default_voice_per_minute(),
            embedding_per_minute: default_embedding_per_minute(),
            general_per_minute: default_general_per_minute(),
            password_reset_per_hour: default_password_reset_per_hour(),
        }
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
