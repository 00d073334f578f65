//! Tests for the usage accounting module

use super::*;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

fn record_at(
    endpoint: Endpoint,
    model: &str,
    tokens: (u32, u32),
    created_at: DateTime<Utc>,
) -> UsageRecord {
    let cost_cents = estimate_cost(model, tokens.0, tokens.1);
    UsageRecord {
        id: Uuid::new_v4(),
        endpoint,
        model: model.to_string(),
        input_tokens: tokens.0,
        output_tokens: tokens.1,
        total_tokens: tokens.0 + tokens.1,
        cost_cents,
        duration_ms: Some(120),
        user_id: Some("user-1".to_string()),
        metadata: None,
        created_at,
    }
}

#[test]
fn test_estimate_cost_known_models() {
    // gpt-4o: 250 cents/1M input, 1000 cents/1M output
    assert_eq!(estimate_cost("gpt-4o", 1000, 1000), 1.25);

    // gpt-4-turbo-preview: 1000 cents/1M input, 3000 cents/1M output
    assert_eq!(estimate_cost("gpt-4-turbo-preview", 2000, 500), 3.5);

    // output-free models
    assert_eq!(estimate_cost("text-embedding-ada-002", 1_000_000, 0), 10.0);
    assert_eq!(estimate_cost("whisper-1", 500_000, 0), 5.0);
}

#[test]
fn test_estimate_cost_is_pure() {
    let first = estimate_cost("gpt-4o", 123_456, 7_890);
    for _ in 0..10 {
        assert_eq!(estimate_cost("gpt-4o", 123_456, 7_890), first);
    }
}

#[test]
fn test_estimate_cost_unknown_model_is_zero() {
    assert_eq!(estimate_cost("gpt-99-ultra", 1_000_000, 1_000_000), 0.0);
    assert_eq!(estimate_cost("", 42, 42), 0.0);
}

#[test]
fn test_estimate_cost_rounds_to_two_decimals() {
    // 1 input + 1 output token of gpt-4o is 0.00125 cents, which rounds away
    assert_eq!(estimate_cost("gpt-4o", 1, 1), 0.0);
    // 10k/10k: 2.5 + 10.0 = 12.5 exactly
    assert_eq!(estimate_cost("gpt-4o", 10_000, 10_000), 12.5);
}

#[test]
fn test_pricing_table_has_all_models() {
    let table = pricing_table();
    assert!(table.contains_key("gpt-4o"));
    assert!(table.contains_key("gpt-4-turbo-preview"));
    assert!(table.contains_key("text-embedding-ada-002"));
    assert!(table.contains_key("whisper-1"));
}

#[tokio::test]
async fn test_record_now_recomputes_cost() {
    let store = Arc::new(MemoryUsageStore::new());
    let tracker = UsageTracker::new(store.clone());

    let record = tracker
        .record_now(ApiCall {
            endpoint: Endpoint::Chat,
            model: "gpt-4o".to_string(),
            input_tokens: 1000,
            output_tokens: 1000,
            duration_ms: Some(250),
            user_id: Some("user-1".to_string()),
            metadata: Some(serde_json::json!({"conversation": "c-1"})),
        })
        .await
        .unwrap();

    assert_eq!(record.cost_cents, 1.25);
    assert_eq!(record.total_tokens, 2000);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_log_is_fire_and_forget() {
    let store = Arc::new(MemoryUsageStore::new());
    let tracker = Arc::new(UsageTracker::new(store.clone()));

    tracker.log(ApiCall {
        endpoint: Endpoint::Transcription,
        model: "whisper-1".to_string(),
        input_tokens: 400,
        output_tokens: 0,
        duration_ms: Some(900),
        user_id: Some("user-1".to_string()),
        metadata: None,
    });

    // The caller does not wait; poll until the detached task lands
    for _ in 0..100 {
        if store.len().await == 1 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("usage record was never persisted");
}

mockall::mock! {
    FailingStore {}

    #[async_trait]
    impl UsageStore for FailingStore {
        async fn append(&self, record: &UsageRecord) -> Result<()>;
        async fn records_between(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<UsageRecord>>;
    }
}

#[tokio::test]
async fn test_log_swallows_persistence_failures() {
    let mut store = MockFailingStore::new();
    store
        .expect_append()
        .returning(|_| Err(Error::Database("store down".to_string())));

    let tracker = Arc::new(UsageTracker::new(Arc::new(store)));

    // Must not panic or surface the failure to the caller
    tracker.log(ApiCall {
        endpoint: Endpoint::Chat,
        model: "gpt-4o".to_string(),
        input_tokens: 10,
        output_tokens: 10,
        duration_ms: None,
        user_id: None,
        metadata: None,
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_summary_totals_match_buckets() {
    let store = Arc::new(MemoryUsageStore::new());
    let base = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    store
        .append(&record_at(Endpoint::Chat, "gpt-4o", (1000, 1000), base))
        .await
        .unwrap();
    store
        .append(&record_at(
            Endpoint::Chat,
            "gpt-4-turbo-preview",
            (2000, 500),
            base + Duration::minutes(1),
        ))
        .await
        .unwrap();
    store
        .append(&record_at(
            Endpoint::Transcription,
            "whisper-1",
            (500_000, 0),
            base + Duration::minutes(2),
        ))
        .await
        .unwrap();

    let tracker = UsageTracker::new(store);
    let summary = tracker
        .summary(base - Duration::hours(1), base + Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(summary.call_count, 3);
    assert_eq!(summary.total_tokens, 2000 + 2500 + 500_000);
    assert_eq!(summary.total_cost_cents, 1.25 + 3.5 + 5.0);

    let endpoint_cost: f64 = summary.by_endpoint.values().map(|b| b.cost_cents).sum();
    let model_cost: f64 = summary.by_model.values().map(|b| b.cost_cents).sum();
    assert!((endpoint_cost - summary.total_cost_cents).abs() < 1e-9);
    assert!((model_cost - summary.total_cost_cents).abs() < 1e-9);

    let endpoint_calls: u64 = summary.by_endpoint.values().map(|b| b.calls).sum();
    assert_eq!(endpoint_calls, summary.call_count);
    assert_eq!(summary.by_endpoint["chat"].calls, 2);
    assert_eq!(summary.by_model["whisper-1"].tokens, 500_000);
}

#[tokio::test]
async fn test_summary_range_is_half_open() {
    let store = Arc::new(MemoryUsageStore::new());
    let start = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap();

    // before, at start (included), just under end, at end (excluded)
    for created_at in [
        start - Duration::seconds(1),
        start,
        end - Duration::seconds(1),
        end,
    ] {
        store
            .append(&record_at(Endpoint::Chat, "gpt-4o", (100, 100), created_at))
            .await
            .unwrap();
    }

    let tracker = UsageTracker::new(store);
    let summary = tracker.summary(start, end).await.unwrap();
    assert_eq!(summary.call_count, 2);
}

#[tokio::test]
async fn test_summary_daily_breakdown_sparse_and_ordered() {
    let store = Arc::new(MemoryUsageStore::new());
    let day1 = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
    let day3 = Utc.with_ymd_and_hms(2026, 3, 12, 23, 59, 59).unwrap();

    // Insert out of calendar order; day 2 has no traffic at all
    store
        .append(&record_at(Endpoint::Chat, "gpt-4o", (1000, 1000), day3))
        .await
        .unwrap();
    store
        .append(&record_at(Endpoint::Chat, "gpt-4o", (1000, 1000), day1))
        .await
        .unwrap();
    store
        .append(&record_at(Endpoint::Embedding, "text-embedding-ada-002", (1000, 0), day1))
        .await
        .unwrap();

    let tracker = UsageTracker::new(store);
    let summary = tracker
        .summary(day1 - Duration::days(1), day3 + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(summary.daily.len(), 2);
    assert_eq!(summary.daily[0].date, day1.date_naive());
    assert_eq!(summary.daily[0].calls, 2);
    assert_eq!(summary.daily[1].date, day3.date_naive());
    assert_eq!(summary.daily[1].calls, 1);
}

#[tokio::test]
async fn test_sqlite_store_round_trip() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteUsageStore::new(pool).await.unwrap();

    let created_at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    let mut record = record_at(Endpoint::Chat, "gpt-4o", (1000, 500), created_at);
    record.metadata = Some(serde_json::json!({"audio_size_bytes": 2048}));
    store.append(&record).await.unwrap();

    let loaded = store
        .records_between(created_at - Duration::hours(1), created_at + Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, record.id);
    assert_eq!(loaded[0].endpoint, Endpoint::Chat);
    assert_eq!(loaded[0].model, "gpt-4o");
    assert_eq!(loaded[0].total_tokens, 1500);
    assert_eq!(loaded[0].cost_cents, record.cost_cents);
    assert_eq!(
        loaded[0].metadata,
        Some(serde_json::json!({"audio_size_bytes": 2048}))
    );

    // Outside the range
    let outside = store
        .records_between(created_at + Duration::hours(2), created_at + Duration::hours(3))
        .await
        .unwrap();
    assert!(outside.is_empty());
}
