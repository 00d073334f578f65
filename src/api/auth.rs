//! Authentication endpoints: register, login, password reset
//!
//! The forgot-password endpoint answers `{ success: true }` whether or
//! not the e-mail has an account, so it cannot be used to enumerate
//! users, and is rate limited per e-mail address on a fixed hourly
//! window.

use crate::email::templates;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{enforce, RateLimitTier};
use crate::server::state::AppState;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
struct RegisterBody {
    email: String,
    #[serde(default)]
    name: Option<String>,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordBody {
    email: String,
}

#[derive(Debug, Deserialize)]
struct ResetPasswordBody {
    token: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    user: UserResponse,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: String,
    email: String,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

fn validate_email(email: &str) -> ApiResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

async fn register(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<Json<SessionResponse>> {
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let user = state
        .auth
        .create_user(body.email.trim(), body.name.as_deref(), &body.password)
        .await?;
    let token = state.auth.create_session(&user.id).await?;

    Ok(Json(SessionResponse {
        token,
        user: UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

async fn login(
    Extension(state): Extension<AppState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<SessionResponse>> {
    let user = state
        .auth
        .verify_credentials(body.email.trim(), &body.password)
        .await?;
    let token = state.auth.create_session(&user.id).await?;

    Ok(Json(SessionResponse {
        token,
        user: UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

async fn forgot_password(
    Extension(state): Extension<AppState>,
    Json(body): Json<ForgotPasswordBody>,
) -> ApiResult<Json<SuccessResponse>> {
    validate_email(&body.email)?;
    let email = body.email.trim().to_lowercase();

    enforce(
        &state.limiter,
        &state.limits,
        &email,
        RateLimitTier::PasswordReset,
    )
    .await?;

    // Same response whether or not the account exists
    let Some(user) = state.auth.find_user_by_email(&email).await? else {
        return Ok(Json(SuccessResponse { success: true }));
    };

    let token = state.auth.create_reset_token(&user.id).await?;
    let reset_link = format!(
        "{}/auth/reset-password?token={}",
        state.config.app_url, token
    );

    state
        .email
        .send(
            &user.email,
            "Reset your Aegis password",
            &templates::password_reset_email(&reset_link),
        )
        .await?;

    info!(user_id = %user.id, "password reset email sent");
    Ok(Json(SuccessResponse { success: true }))
}

async fn reset_password(
    Extension(state): Extension<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> ApiResult<Json<SuccessResponse>> {
    validate_password(&body.password)?;

    let user_id = state.auth.consume_reset_token(&body.token).await?;
    state.auth.set_password(&user_id, &body.password).await?;

    // Old sessions die with the old password
    state.auth.revoke_sessions(&user_id).await?;

    info!(user_id = %user_id, "password reset completed");
    Ok(Json(SuccessResponse { success: true }))
}

/// Create auth routes
pub fn routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password("short").is_err());
    }
}
