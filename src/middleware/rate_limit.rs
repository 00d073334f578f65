//! Per-route rate limiting
//!
//! Maps route classes ("tiers") to the core fixed-window limiter and
//! converts a denial into a 429 with a Retry-After hint. Denial never
//! reaches handlers as anything other than an `ApiError::RateLimited`.

use crate::error::{ApiError, ApiResult};
use crate::server::config::RateLimitSettings;
use aegis_core::rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimitDecision};
use tracing::warn;

/// Route classes with their own limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitTier {
    /// Chat completions (most expensive)
    Chat,
    /// Audio transcription
    Transcription,
    /// Voice calls
    Voice,
    /// Embedding generation
    Embedding,
    /// General API routes
    General,
    /// Password-reset requests (keyed by e-mail, hourly window)
    PasswordReset,
}

impl RateLimitTier {
    /// Operation name used as part of the limiter key
    #[must_use]
    pub fn as_operation(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Transcription => "transcription",
            Self::Voice => "voice",
            Self::Embedding => "embedding",
            Self::General => "general",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// Validated per-tier configurations
#[derive(Debug, Clone)]
pub struct RateLimits {
    chat: RateLimitConfig,
    transcription: RateLimitConfig,
    voice: RateLimitConfig,
    embedding: RateLimitConfig,
    general: RateLimitConfig,
    password_reset: RateLimitConfig,
}

impl RateLimits {
    /// Build tier configs from settings. Fails fast on invalid settings
    /// (zero limits) rather than at request time.
    pub fn from_settings(settings: &RateLimitSettings) -> aegis_core::Result<Self> {
        Ok(Self {
            chat: RateLimitConfig::per_minute(settings.chat_per_minute)?,
            transcription: RateLimitConfig::per_minute(settings.transcription_per_minute)?,
            voice: RateLimitConfig::per_minute(settings.voice_per_minute)?,
            embedding: RateLimitConfig::per_minute(settings.embedding_per_minute)?,
            general: RateLimitConfig::per_minute(settings.general_per_minute)?,
            password_reset: RateLimitConfig::per_hour(settings.password_reset_per_hour)?,
        })
    }

    /// The config for a tier
    #[must_use]
    pub fn for_tier(&self, tier: RateLimitTier) -> &RateLimitConfig {
        match tier {
            RateLimitTier::Chat => &self.chat,
            RateLimitTier::Transcription => &self.transcription,
            RateLimitTier::Voice => &self.voice,
            RateLimitTier::Embedding => &self.embedding,
            RateLimitTier::General => &self.general,
            RateLimitTier::PasswordReset => &self.password_reset,
        }
    }
}

/// Check the limiter for `(key, tier)`; a denial becomes a 429.
pub async fn enforce(
    limiter: &FixedWindowLimiter,
    limits: &RateLimits,
    key: &str,
    tier: RateLimitTier,
) -> ApiResult<RateLimitDecision> {
    let config = limits.for_tier(tier);
    let decision = limiter.check(key, tier.as_operation(), config).await;

    if decision.allowed {
        Ok(decision)
    } else {
        warn!(
            key = %key,
            operation = tier.as_operation(),
            retry_after_secs = decision.retry_after.as_secs(),
            "rate limit exceeded"
        );
        Err(ApiError::RateLimited {
            retry_after_secs: decision.retry_after.as_secs().max(1),
            limit: decision.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enforce_allows_then_denies() {
        let limiter = FixedWindowLimiter::new();
        let mut settings = RateLimitSettings::default();
        settings.transcription_per_minute = 2;
        let limits = RateLimits::from_settings(&settings).unwrap();

        for _ in 0..2 {
            enforce(&limiter, &limits, "user-1", RateLimitTier::Transcription)
                .await
                .unwrap();
        }

        let denied = enforce(&limiter, &limits, "user-1", RateLimitTier::Transcription).await;
        match denied {
            Err(ApiError::RateLimited {
                retry_after_secs,
                limit,
            }) => {
                assert!(retry_after_secs >= 1);
                assert_eq!(limit, 2);
            }
            other => panic!("expected RateLimited, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_tiers_are_isolated() {
        let limiter = FixedWindowLimiter::new();
        let mut settings = RateLimitSettings::default();
        settings.transcription_per_minute = 1;
        let limits = RateLimits::from_settings(&settings).unwrap();

        enforce(&limiter, &limits, "user-1", RateLimitTier::Transcription)
            .await
            .unwrap();
        // Chat tier for the same user is unaffected
        enforce(&limiter, &limits, "user-1", RateLimitTier::Chat)
            .await
            .unwrap();
    }

    #[test]
    fn test_invalid_settings_fail_fast() {
        let mut settings = RateLimitSettings::default();
        settings.chat_per_minute = 0;
        assert!(RateLimits::from_settings(&settings).is_err());
    }
}
