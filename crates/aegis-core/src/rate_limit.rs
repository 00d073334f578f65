//! Fixed-window rate limiting keyed by user and operation
//!
//! Divides time into non-overlapping windows per `(user, operation)` pair,
//! each with its own request count. A request in an expired or absent
//! window starts a fresh one; a request in an open window increments the
//! count until the maximum, after which requests are denied until the
//! window resets. Up to 2x the maximum can be admitted across a window
//! seam; that is a property of the scheme, not a bug.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Rate limit configuration for one operation
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in one window
    pub max_requests: u32,
    /// Window duration
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new config.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for a zero maximum or zero window,
    /// a programmer error caught at construction rather than per request.
    pub fn new(max_requests: u32, window: Duration) -> Result<Self> {
        if max_requests == 0 {
            return Err(Error::invalid_config(
                "max_requests",
                "must be at least 1",
            ));
        }
        if window.is_zero() {
            return Err(Error::invalid_config("window", "must be positive"));
        }
        Ok(Self {
            max_requests,
            window,
        })
    }

    /// Config for requests per minute
    pub fn per_minute(max_requests: u32) -> Result<Self> {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Config for requests per hour
    pub fn per_hour(max_requests: u32) -> Result<Self> {
        Self::new(max_requests, Duration::from_secs(3600))
    }
}

/// Outcome of a rate limit check.
///
/// Denial is an ordinary outcome communicated as data, never an error.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests per window for this operation
    pub limit: u32,
    /// Requests remaining in the current window
    pub remaining: u32,
    /// Time until the current window resets
    pub retry_after: Duration,
}

/// Counter state for one `(user, operation)` pair
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    resets_at: Instant,
}

/// In-memory fixed-window rate limiter.
///
/// State is per-process: with N instances the effective limit is N times
/// the configured maximum. Entries are overwritten in place when their
/// window expires but are not evicted; [`FixedWindowLimiter::sweep_expired`]
/// exists for callers that want a periodic sweep.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    windows: RwLock<HashMap<(String, String), WindowState>>,
}

impl FixedWindowLimiter {
    /// Create a new limiter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and count a request for `(user, operation)` under `config`.
    pub async fn check(
        &self,
        user: &str,
        operation: &str,
        config: &RateLimitConfig,
    ) -> RateLimitDecision {
        self.check_at(user, operation, config, Instant::now()).await
    }

    /// Check at an explicit point in time. The whole read-modify-write
    /// runs under one write lock so concurrent requests for the same key
    /// cannot both observe the same count.
    async fn check_at(
        &self,
        user: &str,
        operation: &str,
        config: &RateLimitConfig,
        now: Instant,
    ) -> RateLimitDecision {
        let key = (user.to_string(), operation.to_string());
        let mut windows = self.windows.write().await;

        let state = windows.entry(key).or_insert_with(|| WindowState {
            count: 0,
            resets_at: now + config.window,
        });

        if now >= state.resets_at {
            // The previous window has expired; start a fresh one in place
            state.count = 0;
            state.resets_at = now + config.window;
        }

        if state.count < config.max_requests {
            state.count += 1;
            RateLimitDecision {
                allowed: true,
                limit: config.max_requests,
                remaining: config.max_requests - state.count,
                retry_after: state.resets_at - now,
            }
        } else {
            let retry_after = state.resets_at - now;
            debug!(
                user = %user,
                operation = %operation,
                retry_after_secs = retry_after.as_secs(),
                "rate limit exceeded"
            );
            RateLimitDecision {
                allowed: false,
                limit: config.max_requests,
                remaining: 0,
                retry_after,
            }
        }
    }

    /// Remove entries whose window has expired. Returns how many were
    /// dropped. Not required for correctness; expired entries are
    /// overwritten on their next request anyway.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, state| now < state.resets_at);
        before - windows.len()
    }

    /// Number of tracked `(user, operation)` pairs
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}
