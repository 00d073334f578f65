//! Transactional e-mail
//!
//! Posts to the e-mail provider's HTTP API. The client is constructed
//! whether or not a key is configured; sending without one fails with
//! `NotConfigured` so callers can decide how loudly to fail.

pub mod templates;

use serde::Serialize;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const SEND_TIMEOUT_SECS: u64 = 10;

/// E-mail sending errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// No provider API key configured
    #[error("email provider is not configured")]
    NotConfigured,

    /// Network/transport error
    #[error("email network error: {0}")]
    Network(String),

    /// The provider rejected the request
    #[error("email provider error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider message
        message: String,
    },
}

impl From<reqwest::Error> for EmailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// E-mail provider client
pub struct EmailClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    from: String,
}

impl EmailClient {
    /// Create a client. `api_key = None` produces a client that errors on
    /// send, matching deployments that have not set up e-mail yet.
    pub fn new(api_key: Option<String>, from: impl Into<String>) -> anyhow::Result<Self> {
        if api_key.is_none() {
            warn!("RESEND_API_KEY not set - transactional e-mail will fail");
        }
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            from: from.into(),
        })
    }

    /// Point the client at a custom provider URL (tests)
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send one e-mail
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let Some(api_key) = &self.api_key else {
            return Err(EmailError::NotConfigured);
        };

        let body = SendEmailBody {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_errors() {
        let client = EmailClient::new(None, "noreply@aegis.health").unwrap();
        let result = client.send("ana@example.com", "Hi", "<p>Hi</p>").await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_network_failure_surfaces() {
        let client = EmailClient::new(Some("re_test_key".to_string()), "noreply@aegis.health")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");

        let result = client.send("ana@example.com", "Hi", "<p>Hi</p>").await;
        assert!(matches!(result, Err(EmailError::Network(_))));
    }
}
