//! Users, bearer sessions and password-reset tokens
//!
//! Raw tokens are returned to callers exactly once and only their SHA-256
//! digests are stored. Admin access is an e-mail allowlist supplied by
//! configuration. The broader identity story (OAuth, SSO) is an external
//! collaborator; this store covers credential checks and session state.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Session lifetime in days
const SESSION_TTL_DAYS: i64 = 30;

/// Password-reset token lifetime in hours
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Authentication/authorization errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials provided
    #[error("authentication required")]
    MissingCredentials,

    /// Unknown, expired or revoked token; or a bad email/password pair
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration with an e-mail that already has an account
    #[error("email already registered")]
    EmailTaken,

    /// Unknown, expired or already-used reset token
    #[error("reset token invalid or expired")]
    InvalidResetToken,

    /// Internal error
    #[error("auth internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Auth result type
pub type Result<T> = std::result::Result<T, AuthError>;

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// User ID
    pub id: String,
    /// E-mail address (unique)
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Authenticated context attached to each request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User identifier
    pub user_id: String,
    /// User e-mail
    pub email: String,
    /// Whether the user is on the admin allowlist
    pub is_admin: bool,
}

/// User, session and reset-token storage
pub struct AuthStore {
    pool: SqlitePool,
    admin_emails: Vec<String>,
}

impl AuthStore {
    /// Create a store over an existing pool and initialize the schema.
    /// `admin_emails` is the allowlist for admin-only endpoints.
    pub async fn new(pool: SqlitePool, admin_emails: Vec<String>) -> Result<Self> {
        let store = Self { pool, admin_emails };
        store.init_schema().await?;
        info!(admins = store.admin_emails.len(), "auth store initialized");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token_hash TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS password_reset_tokens (
                token_hash TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether an e-mail is on the admin allowlist
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|a| a == email)
    }

    /// Register a new user
    pub async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(hash_password(password))
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(user_id = %user.id, "user registered");
                Ok(user)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Look up a user by e-mail
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<(String, String, Option<String>, DateTime<Utc>)> =
            sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, email, name, created_at)| User {
            id,
            email,
            name,
            created_at,
        }))
    }

    /// Verify an email/password pair. Returns the user on success,
    /// `InvalidCredentials` otherwise; the caller cannot tell an unknown
    /// e-mail from a wrong password.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        let row: Option<(String, String, Option<String>, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((id, email, name, password_hash, created_at))
                if verify_password(password, &password_hash) =>
            {
                Ok(User {
                    id,
                    email,
                    name,
                    created_at,
                })
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Issue a new session for a user. Returns the raw bearer token,
    /// shown to the caller exactly once.
    pub async fn create_session(&self, user_id: &str) -> Result<String> {
        let raw_token = format!("aegis_{}", Uuid::new_v4().as_simple());
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(hash_token(&raw_token))
        .bind(user_id)
        .bind(now)
        .bind(now + Duration::days(SESSION_TTL_DAYS))
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user_id, "session created");
        Ok(raw_token)
    }

    /// Validate a bearer token and produce the request's auth context
    pub async fn validate_session(&self, token: &str) -> Result<AuthContext> {
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT users.id, users.email, sessions.expires_at
            FROM sessions
            JOIN users ON users.id = sessions.user_id
            WHERE sessions.token_hash = ?
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((user_id, email, expires_at)) if expires_at > Utc::now() => {
                let is_admin = self.is_admin_email(&email);
                Ok(AuthContext {
                    user_id,
                    email,
                    is_admin,
                })
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Revoke all sessions for a user (e.g. after a password reset).
    /// Returns how many were dropped.
    pub async fn revoke_sessions(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Issue a password-reset token with a 1-hour TTL. Any previous reset
    /// tokens for the user are invalidated.
    pub async fn create_reset_token(&self, user_id: &str) -> Result<String> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let raw_token = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO password_reset_tokens (token_hash, user_id, expires_at) VALUES (?, ?, ?)",
        )
        .bind(hash_token(&raw_token))
        .bind(user_id)
        .bind(Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS))
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user_id, "password reset token issued");
        Ok(raw_token)
    }

    /// Consume a reset token. Single use: the token is deleted whether or
    /// not it had expired. Returns the owning user's ID.
    pub async fn consume_reset_token(&self, token: &str) -> Result<String> {
        let token_hash = hash_token(token);

        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT user_id, expires_at FROM password_reset_tokens WHERE token_hash = ?",
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, expires_at)) = row else {
            return Err(AuthError::InvalidResetToken);
        };

        sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&self.pool)
            .await?;

        if expires_at <= Utc::now() {
            return Err(AuthError::InvalidResetToken);
        }

        Ok(user_id)
    }

    /// Replace a user's password
    pub async fn set_password(&self, user_id: &str, password: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(hash_password(password))
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::Internal(format!("no such user: {user_id}")));
        }

        info!(user_id = %user_id, "password updated");
        Ok(())
    }
}

/// SHA-256 hex digest of a token; raw tokens never hit storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    to_hex(&hasher.finalize())
}

/// Salted credential digest, stored as `salt$hex`
fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().as_simple().to_string();
    format!("{}${}", salt, salted_digest(&salt, password))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => salted_digest(salt, password) == digest,
        None => false,
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests;
