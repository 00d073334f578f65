//! Authentication extractors
//!
//! `RequireAuth` pulls the bearer token from the request, validates it
//! against the auth store and hands the handler an `AuthContext`.
//! `RequireAdmin` additionally requires the user to be on the admin
//! allowlist. Rejections render through `ApiError`.

use crate::error::ApiError;
use crate::server::state::AppState;
use aegis_core::auth::AuthContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Extractor that requires a valid session
pub struct RequireAuth(pub AuthContext);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| ApiError::Internal("AppState not configured".to_string()))?;

        let token = extract_bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let ctx = state.auth.validate_session(&token).await?;
        Ok(RequireAuth(ctx))
    }
}

/// Extractor that requires a valid session for an allowlisted admin
pub struct RequireAdmin(pub AuthContext);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let RequireAuth(ctx) = RequireAuth::from_request_parts(parts, state).await?;
        if !ctx.is_admin {
            return Err(ApiError::Forbidden);
        }
        Ok(RequireAdmin(ctx))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn extract_bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/chat");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_extract_bearer_token() {
        let parts = parts_with_header(Some("Bearer aegis_abc123"));
        assert_eq!(extract_bearer_token(&parts).as_deref(), Some("aegis_abc123"));
    }

    #[test]
    fn test_extract_bearer_token_missing_or_malformed() {
        assert!(extract_bearer_token(&parts_with_header(None)).is_none());
        assert!(extract_bearer_token(&parts_with_header(Some("Basic abc"))).is_none());
    }
}
