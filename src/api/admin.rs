//! Admin usage dashboard endpoint

use crate::error::ApiResult;
use crate::middleware::RequireAdmin;
use crate::server::state::AppState;
use aegis_core::usage::UsageSummary;
use axum::extract::Query;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_RANGE_DAYS: i64 = 7;
const MAX_RANGE_DAYS: i64 = 90;

#[derive(Debug, Deserialize)]
struct UsageQuery {
    #[serde(default)]
    days: Option<String>,
}

#[derive(Debug, Serialize)]
struct UsageResponse {
    range_days: i64,
    summary: UsageSummary,
}

/// Parse the requested range; anything missing, non-integer or outside
/// 1..=90 falls back to the default rather than erroring.
fn parse_range(raw: Option<&str>) -> i64 {
    match raw.and_then(|r| r.parse::<i64>().ok()) {
        Some(days) if (1..=MAX_RANGE_DAYS).contains(&days) => days,
        _ => DEFAULT_RANGE_DAYS,
    }
}

async fn usage_summary(
    RequireAdmin(_ctx): RequireAdmin,
    Extension(state): Extension<AppState>,
    Query(query): Query<UsageQuery>,
) -> ApiResult<Json<UsageResponse>> {
    let range_days = parse_range(query.days.as_deref());
    let end = Utc::now();
    let start = end - Duration::days(range_days);

    let summary = state.usage.summary(start, end).await?;
    Ok(Json(UsageResponse {
        range_days,
        summary,
    }))
}

/// Create admin routes
pub fn routes() -> Router {
    Router::new().route("/api/admin/usage", get(usage_summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range(None), 7);
        assert_eq!(parse_range(Some("30")), 30);
        assert_eq!(parse_range(Some("1")), 1);
        assert_eq!(parse_range(Some("90")), 90);
        // Out of range or malformed falls back to the default
        assert_eq!(parse_range(Some("0")), 7);
        assert_eq!(parse_range(Some("91")), 7);
        assert_eq!(parse_range(Some("-3")), 7);
        assert_eq!(parse_range(Some("abc")), 7);
        assert_eq!(parse_range(Some("7.5")), 7);
    }
}
