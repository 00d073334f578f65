//! API error type and response mapping
//!
//! Every failure leaving a handler goes through `ApiError`, which renders
//! a `{ success, error, code }` JSON body with the right status. Internal
//! details are logged, never returned.

use aegis_core::auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or unacceptable request
    #[error("{0}")]
    BadRequest(String),

    /// No credentials provided
    #[error("authentication required")]
    Unauthorized,

    /// Unknown or expired credentials
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authenticated but not allowed
    #[error("forbidden")]
    Forbidden,

    /// Requested entity does not exist
    #[error("not found")]
    NotFound,

    /// Too many requests for this operation
    #[error("rate limited")]
    RateLimited {
        /// Seconds until the window resets
        retry_after_secs: u64,
        /// Window maximum for this operation
        limit: u32,
    },

    /// An upstream service failed
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal error; detail is logged, not returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => {
                "Too many requests. Please slow down and try again shortly.".to_string()
            }
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(detail = %detail, "internal error");
        }

        let body = ErrorBody {
            success: false,
            error: self.public_message(),
            code: self.code(),
            retry_after_secs: match &self {
                Self::RateLimited {
                    retry_after_secs, ..
                } => Some(*retry_after_secs),
                _ => None,
            },
        };

        match self {
            Self::RateLimited {
                retry_after_secs,
                limit,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [
                    ("Retry-After", retry_after_secs.to_string()),
                    ("X-RateLimit-Limit", limit.to_string()),
                    ("X-RateLimit-Remaining", "0".to_string()),
                ],
                Json(body),
            )
                .into_response(),
            other => (other.status(), Json(body)).into_response(),
        }
    }
}

impl From<aegis_core::Error> for ApiError {
    fn from(err: aegis_core::Error) -> Self {
        match err {
            aegis_core::Error::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => Self::Unauthorized,
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::EmailTaken => Self::BadRequest("email already registered".to_string()),
            AuthError::InvalidResetToken => {
                Self::BadRequest("reset token invalid or expired".to_string())
            }
            AuthError::Internal(detail) => Self::Internal(detail),
        }
    }
}

impl From<crate::email::EmailError> for ApiError {
    fn from(err: crate::email::EmailError) -> Self {
        match err {
            crate::email::EmailError::NotConfigured => Self::Internal(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<aegis_llm::Error> for ApiError {
    fn from(err: aegis_llm::Error) -> Self {
        match err {
            aegis_llm::Error::ApiKeyMissing { .. } => Self::Internal(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// Result alias for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: 30,
                limit: 10
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Upstream("llm down".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::Internal("sqlite disk full at /var/db".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_auth_error_conversion() {
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from(AuthError::EmailTaken),
            ApiError::BadRequest(_)
        ));
    }
}
