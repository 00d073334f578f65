//! Usage records and summary types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// External API endpoint class a usage record is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Chat completions
    Chat,
    /// Embedding generation
    Embedding,
    /// Audio transcription
    Transcription,
    /// Voice calls
    Voice,
}

impl Endpoint {
    /// Returns the string representation used in storage and the API
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Embedding => "embedding",
            Self::Transcription => "transcription",
            Self::Voice => "voice",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "embedding" => Ok(Self::Embedding),
            "transcription" => Ok(Self::Transcription),
            "voice" => Ok(Self::Voice),
            other => Err(format!("unknown endpoint: {other}")),
        }
    }
}

/// A single external API usage record.
///
/// Created once per call and never mutated; retention is an external
/// concern. The cost is always recomputed from the price table when the
/// record is built, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Record ID
    pub id: Uuid,
    /// Endpoint class
    pub endpoint: Endpoint,
    /// Model identifier
    pub model: String,
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Input + output tokens
    pub total_tokens: u32,
    /// Estimated cost in fractional USD cents
    pub cost_cents: f64,
    /// Wall-clock duration of the call in milliseconds
    pub duration_ms: Option<u64>,
    /// Originating user (absent for system-initiated calls)
    pub user_id: Option<String>,
    /// Free-form metadata
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Subtotal for one endpoint or model bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketTotals {
    /// Estimated cost (fractional cents)
    pub cost_cents: f64,
    /// Input + output tokens
    pub tokens: u64,
    /// Call count
    pub calls: u64,
}

/// Subtotal for one calendar day (UTC)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Calendar day in the UTC reporting timezone
    pub date: NaiveDate,
    /// Estimated cost (fractional cents)
    pub cost_cents: f64,
    /// Call count
    pub calls: u64,
}

/// Aggregated usage over a time range.
///
/// The daily breakdown is sparse: days with no records are omitted rather
/// than zero-filled, and entries are ordered by day ascending. Dates are
/// bucketed in UTC so boundaries are reproducible regardless of server
/// locale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSummary {
    /// Total estimated cost (fractional cents)
    pub total_cost_cents: f64,
    /// Total tokens (input + output across all records)
    pub total_tokens: u64,
    /// Total call count
    pub call_count: u64,
    /// Subtotals by endpoint name
    pub by_endpoint: HashMap<String, BucketTotals>,
    /// Subtotals by model identifier
    pub by_model: HashMap<String, BucketTotals>,
    /// Day-by-day breakdown, ascending
    pub daily: Vec<DailyUsage>,
}
