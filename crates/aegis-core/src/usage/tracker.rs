//! Usage tracker - fire-and-forget logging and range summaries

use super::pricing::estimate_cost;
use super::record::{DailyUsage, Endpoint, UsageRecord, UsageSummary};
use super::store::UsageStore;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Parameters describing one external API call to record
#[derive(Debug, Clone)]
pub struct ApiCall {
    /// Endpoint class
    pub endpoint: Endpoint,
    /// Model identifier
    pub model: String,
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Wall-clock duration of the call in milliseconds
    pub duration_ms: Option<u64>,
    /// Originating user
    pub user_id: Option<String>,
    /// Free-form metadata
    pub metadata: Option<serde_json::Value>,
}

/// Usage tracker over a record store.
///
/// Logging is best-effort by contract: request handlers call [`UsageTracker::log`]
/// as a side effect and must never fail or wait because of it.
pub struct UsageTracker {
    store: Arc<dyn UsageStore>,
    /// Daily spend (cents) above which a warning is emitted
    alert_threshold_cents: Option<f64>,
}

impl UsageTracker {
    /// Create a tracker over the given store
    #[must_use]
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self {
            store,
            alert_threshold_cents: None,
        }
    }

    /// Emit a warning whenever the current UTC day's spend exceeds the
    /// given threshold (fractional cents)
    #[must_use]
    pub fn with_alert_threshold(mut self, cents: f64) -> Self {
        self.alert_threshold_cents = Some(cents);
        self
    }

    /// Record a call and wait for persistence.
    ///
    /// The cost is always recomputed from the price table; callers cannot
    /// supply one. Prefer [`UsageTracker::log`] from request handlers.
    pub async fn record_now(&self, call: ApiCall) -> crate::error::Result<UsageRecord> {
        let cost_cents = estimate_cost(&call.model, call.input_tokens, call.output_tokens);

        let record = UsageRecord {
            id: Uuid::new_v4(),
            endpoint: call.endpoint,
            model: call.model,
            input_tokens: call.input_tokens,
            output_tokens: call.output_tokens,
            total_tokens: call.input_tokens + call.output_tokens,
            cost_cents,
            duration_ms: call.duration_ms,
            user_id: call.user_id,
            metadata: call.metadata,
            created_at: Utc::now(),
        };

        self.store.append(&record).await?;
        debug!(
            endpoint = %record.endpoint,
            model = %record.model,
            cost_cents = record.cost_cents,
            "api usage recorded"
        );

        self.check_daily_threshold().await;
        Ok(record)
    }

    /// Record a call without blocking the caller.
    ///
    /// Runs on a detached task: persistence failures are logged and
    /// swallowed, and the task is independent of the calling request's
    /// lifetime, so an aborted request never leaves a half-written record.
    pub fn log(self: &Arc<Self>, call: ApiCall) {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = tracker.record_now(call).await {
                warn!(error = %err, "failed to record api usage (non-fatal)");
            }
        });
    }

    /// Warn when today's spend crosses the configured threshold.
    /// Best-effort: a failed read never surfaces to the caller.
    async fn check_daily_threshold(&self) {
        let Some(threshold) = self.alert_threshold_cents else {
            return;
        };

        let day_start = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let day_end = day_start + Duration::days(1);

        match self.store.records_between(day_start, day_end).await {
            Ok(records) => {
                let spent: f64 = records.iter().map(|r| r.cost_cents).sum();
                if spent > threshold {
                    warn!(
                        spent_cents = spent,
                        threshold_cents = threshold,
                        "daily API spend exceeds alert threshold"
                    );
                }
            }
            Err(err) => debug!(error = %err, "daily spend check skipped"),
        }
    }

    /// Summarize all records with `start <= created_at < end`.
    ///
    /// Storage failures propagate: there is no sensible partial summary.
    pub async fn summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> crate::error::Result<UsageSummary> {
        let records = self.store.records_between(start, end).await?;

        let mut summary = UsageSummary::default();
        let mut daily: BTreeMap<NaiveDate, DailyUsage> = BTreeMap::new();

        for record in &records {
            summary.total_cost_cents += record.cost_cents;
            summary.total_tokens += u64::from(record.total_tokens);
            summary.call_count += 1;

            let endpoint_totals = summary
                .by_endpoint
                .entry(record.endpoint.as_str().to_string())
                .or_default();
            endpoint_totals.cost_cents += record.cost_cents;
            endpoint_totals.tokens += u64::from(record.total_tokens);
            endpoint_totals.calls += 1;

            let model_totals = summary.by_model.entry(record.model.clone()).or_default();
            model_totals.cost_cents += record.cost_cents;
            model_totals.tokens += u64::from(record.total_tokens);
            model_totals.calls += 1;

            let date = record.created_at.date_naive();
            let day = daily.entry(date).or_insert(DailyUsage {
                date,
                cost_cents: 0.0,
                calls: 0,
            });
            day.cost_cents += record.cost_cents;
            day.calls += 1;
        }

        summary.daily = daily.into_values().collect();
        Ok(summary)
    }
}
