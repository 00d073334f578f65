//! Usage Accounting - external API usage and cost tracking
//!
//! Records every external API call with token counts and an estimated cost,
//! and aggregates records into summaries for the admin dashboard.
//!
//! # Module Structure
//!
//! - `pricing`: static model price table and cost estimation
//! - `record`: usage records and summary types
//! - `store`: storage backends (in-memory, SQLite)
//! - `tracker`: fire-and-forget logging and range summaries

mod pricing;
mod record;
mod store;
mod tracker;

#[cfg(test)]
mod tests;

pub use pricing::{estimate_cost, pricing_table, ModelPricing};
pub use record::{BucketTotals, DailyUsage, Endpoint, UsageRecord, UsageSummary};
pub use store::{MemoryUsageStore, SqliteUsageStore, UsageStore};
pub use tracker::{ApiCall, UsageTracker};
