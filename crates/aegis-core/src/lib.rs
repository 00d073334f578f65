//! Aegis Core - Domain logic for the healthcare-insurance assistant
//!
//! This crate provides the domain layer shared by the Aegis server:
//! - Usage: external API usage accounting (price table, records, summaries)
//! - RateLimit: fixed-window request limiting keyed by user and operation
//! - Documents: plan-document chunking, classification and status lifecycle
//! - Insurer: insurer detection by keyword scan over document text
//! - Auth: users, bearer sessions and password-reset tokens
//! - Error: shared error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod documents;
pub mod error;
pub mod insurer;
pub mod rate_limit;
pub mod usage;

pub use auth::{AuthContext, AuthError, AuthStore, User};
pub use documents::{
    chunk_text, detect_document_type, is_likely_scanned, ChunkRecord, DocumentRecord,
    DocumentStatus, DocumentStore, DocumentType,
};
pub use error::{Error, Result};
pub use insurer::{detect_insurer, insurer_directories, InsurerDirectory};
pub use rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimitDecision};
pub use usage::{
    estimate_cost, ApiCall, BucketTotals, DailyUsage, Endpoint, MemoryUsageStore, ModelPricing,
    SqliteUsageStore, UsageRecord, UsageStore, UsageSummary, UsageTracker,
};
