//! Request middleware: authentication extractors and rate limiting

pub mod auth;
pub mod rate_limit;

pub use auth::{RequireAdmin, RequireAuth};
pub use rate_limit::{enforce, RateLimitTier, RateLimits};
