//! Error types for aegis-llm

use thiserror::Error;

/// LLM client error type
#[derive(Debug, Error)]
pub enum Error {
    /// No API key configured
    #[error("API key not configured for {provider}")]
    ApiKeyMissing {
        /// Provider name
        provider: String,
    },

    /// Network/transport error
    #[error("network error: {0}")]
    Network(String),

    /// The API returned a non-success status
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Sanitized error message
        message: String,
    },

    /// The API response did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Strip provider error text down to something safe to log and return.
/// Auth failures and rate limits map to fixed messages so keys and quota
/// details never leak into logs or user-facing errors.
#[must_use]
pub fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Check the API key configuration.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "API rate limit exceeded. Try again later.".to_string();
    }

    if error.len() > 300 {
        let mut truncated: String = error.chars().take(300).collect();
        truncated.push_str("...(truncated)");
        truncated
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_hides_auth_details() {
        let raw = "Incorrect API key provided: sk-abc123. You can find your key at ...";
        let sanitized = sanitize_api_error(raw);
        assert!(!sanitized.contains("sk-abc123"));
        assert!(sanitized.contains("authentication"));
    }

    #[test]
    fn test_sanitize_rate_limit() {
        let sanitized = sanitize_api_error("Rate limit reached for gpt-4o");
        assert!(sanitized.contains("rate limit"));
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let raw = "x".repeat(1000);
        let sanitized = sanitize_api_error(&raw);
        assert!(sanitized.len() < 400);
        assert!(sanitized.ends_with("(truncated)"));
    }

    #[test]
    fn test_sanitize_passes_ordinary_messages() {
        let raw = "The model `gpt-99` does not exist";
        assert_eq!(sanitize_api_error(raw), raw);
    }
}
