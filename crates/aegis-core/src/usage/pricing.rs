//! Model pricing - static price table for external API cost estimation
//!
//! Costs are expressed in USD cents per 1M tokens and estimates in
//! fractional cents, so that many small per-token costs can be summed
//! without losing precision to dollar rounding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// GPT-4o input cost per 1M tokens (USD cents)
pub const GPT4O_INPUT_CENTS: f64 = 250.0;
/// GPT-4o output cost per 1M tokens (USD cents)
pub const GPT4O_OUTPUT_CENTS: f64 = 1000.0;

/// GPT-4 Turbo input cost per 1M tokens (USD cents)
pub const GPT4_TURBO_INPUT_CENTS: f64 = 1000.0;
/// GPT-4 Turbo output cost per 1M tokens (USD cents)
pub const GPT4_TURBO_OUTPUT_CENTS: f64 = 3000.0;

/// text-embedding-ada-002 cost per 1M tokens (USD cents, input only)
pub const ADA_EMBEDDING_CENTS: f64 = 10.0;

/// Whisper cost per 1M estimated tokens (USD cents, input only)
pub const WHISPER_CENTS: f64 = 10.0;

/// Pricing for a single model (cents per 1M tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model identifier
    pub model: String,
    /// Cost per 1M input tokens (USD cents)
    pub input_cents_per_million: f64,
    /// Cost per 1M output tokens (USD cents)
    pub output_cents_per_million: f64,
}

impl ModelPricing {
    /// Calculate the estimated cost in fractional cents for the given
    /// token counts, rounded to 2 decimal places.
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_cents_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_cents_per_million;
        round_cents(input_cost + output_cost)
    }
}

/// Round fractional cents to 2 decimal places so repeated summation stays
/// stable across aggregation.
fn round_cents(cents: f64) -> f64 {
    (cents * 100.0).round() / 100.0
}

static PRICING_TABLE: LazyLock<HashMap<&'static str, ModelPricing>> = LazyLock::new(|| {
    let mut table = HashMap::new();

    table.insert(
        "gpt-4o",
        ModelPricing {
            model: "gpt-4o".to_string(),
            input_cents_per_million: GPT4O_INPUT_CENTS,
            output_cents_per_million: GPT4O_OUTPUT_CENTS,
        },
    );

    table.insert(
        "gpt-4-turbo-preview",
        ModelPricing {
            model: "gpt-4-turbo-preview".to_string(),
            input_cents_per_million: GPT4_TURBO_INPUT_CENTS,
            output_cents_per_million: GPT4_TURBO_OUTPUT_CENTS,
        },
    );

    table.insert(
        "text-embedding-ada-002",
        ModelPricing {
            model: "text-embedding-ada-002".to_string(),
            input_cents_per_million: ADA_EMBEDDING_CENTS,
            output_cents_per_million: 0.0,
        },
    );

    table.insert(
        "whisper-1",
        ModelPricing {
            model: "whisper-1".to_string(),
            input_cents_per_million: WHISPER_CENTS,
            output_cents_per_million: 0.0,
        },
    );

    table
});

/// The process-wide price table.
#[must_use]
pub fn pricing_table() -> &'static HashMap<&'static str, ModelPricing> {
    &PRICING_TABLE
}

/// Estimate the cost of an API call in fractional USD cents.
///
/// Pure and deterministic: the same inputs always produce the same output.
/// Unknown models cost exactly 0 rather than failing, so new models never
/// break request handling before the table catches up.
#[must_use]
pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    match PRICING_TABLE.get(model) {
        Some(pricing) => pricing.calculate_cost(input_tokens, output_tokens),
        None => 0.0,
    }
}
