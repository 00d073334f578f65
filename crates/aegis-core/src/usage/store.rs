//! Usage record storage backends
//!
//! The store contract is deliberately narrow: append one record, read
//! records in a time range. Any engine that satisfies it works; the
//! tracker does all aggregation itself.

use super::record::{Endpoint, UsageRecord};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Storage contract for usage records
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Append one record
    async fn append(&self, record: &UsageRecord) -> Result<()>;

    /// All records with `start <= created_at < end`, ascending by creation time
    async fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>>;
}

/// In-memory usage store (for development and tests)
#[derive(Default)]
pub struct MemoryUsageStore {
    records: RwLock<Vec<UsageRecord>>,
}

impl MemoryUsageStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn append(&self, record: &UsageRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(())
    }

    async fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>> {
        let records = self.records.read().await;
        let mut matched: Vec<UsageRecord> = records
            .iter()
            .filter(|r| r.created_at >= start && r.created_at < end)
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.created_at);
        Ok(matched)
    }
}

/// SQLite-backed usage store
pub struct SqliteUsageStore {
    pool: SqlitePool,
}

type UsageRow = (
    String,         // id
    String,         // endpoint
    String,         // model
    i64,            // input_tokens
    i64,            // output_tokens
    i64,            // total_tokens
    f64,            // cost_cents
    Option<i64>,    // duration_ms
    Option<String>, // user_id
    Option<String>, // metadata
    DateTime<Utc>,  // created_at
);

impl SqliteUsageStore {
    /// Create a store over an existing pool and initialize the schema
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        info!("SQLite usage store initialized");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_usage (
                id TEXT PRIMARY KEY,
                endpoint TEXT NOT NULL,
                model TEXT NOT NULL,
                input_tokens INTEGER NOT NULL,
                output_tokens INTEGER NOT NULL,
                total_tokens INTEGER NOT NULL,
                cost_cents REAL NOT NULL,
                duration_ms INTEGER,
                user_id TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Summaries filter on the creation timestamp
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_api_usage_created_at ON api_usage(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_record(row: UsageRow) -> Result<UsageRecord> {
        let (
            id,
            endpoint,
            model,
            input_tokens,
            output_tokens,
            total_tokens,
            cost_cents,
            duration_ms,
            user_id,
            metadata,
            created_at,
        ) = row;

        let metadata = match metadata {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(UsageRecord {
            id: Uuid::parse_str(&id).map_err(|e| Error::Database(e.to_string()))?,
            endpoint: Endpoint::from_str(&endpoint).map_err(Error::Database)?,
            model,
            input_tokens: input_tokens as u32,
            output_tokens: output_tokens as u32,
            total_tokens: total_tokens as u32,
            cost_cents,
            duration_ms: duration_ms.map(|d| d as u64),
            user_id,
            metadata,
            created_at,
        })
    }
}

#[async_trait]
impl UsageStore for SqliteUsageStore {
    async fn append(&self, record: &UsageRecord) -> Result<()> {
        let metadata = match &record.metadata {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        // One INSERT per record: a write is all fields or none
        sqlx::query(
            r#"
            INSERT INTO api_usage
                (id, endpoint, model, input_tokens, output_tokens, total_tokens,
                 cost_cents, duration_ms, user_id, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.endpoint.as_str())
        .bind(&record.model)
        .bind(i64::from(record.input_tokens))
        .bind(i64::from(record.output_tokens))
        .bind(i64::from(record.total_tokens))
        .bind(record.cost_cents)
        .bind(record.duration_ms.map(|d| d as i64))
        .bind(&record.user_id)
        .bind(metadata)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        debug!(endpoint = %record.endpoint, model = %record.model, "usage record appended");
        Ok(())
    }

    async fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>> {
        let rows: Vec<UsageRow> = sqlx::query_as(
            r#"
            SELECT id, endpoint, model, input_tokens, output_tokens, total_tokens,
                   cost_cents, duration_ms, user_id, metadata, created_at
            FROM api_usage
            WHERE created_at >= ? AND created_at < ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
