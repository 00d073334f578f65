//! Provider lookup endpoint (NPPES NPI registry)

use crate::error::{ApiError, ApiResult};
use crate::middleware::{enforce, RateLimitTier, RequireAuth};
use crate::nppes::NpiLookupResult;
use crate::server::state::AppState;
use axum::extract::Query;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ProviderQuery {
    name: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProviderResponse {
    provider: Option<NpiLookupResult>,
}

async fn lookup_provider(
    RequireAuth(ctx): RequireAuth,
    Extension(state): Extension<AppState>,
    Query(query): Query<ProviderQuery>,
) -> ApiResult<Json<ProviderResponse>> {
    if query.name.trim().is_empty() {
        return Err(ApiError::BadRequest("provider name is required".to_string()));
    }

    enforce(
        &state.limiter,
        &state.limits,
        &ctx.user_id,
        RateLimitTier::General,
    )
    .await?;

    let provider = state
        .nppes
        .lookup(query.name.trim(), query.state.as_deref())
        .await;

    Ok(Json(ProviderResponse { provider }))
}

/// Create provider routes
pub fn routes() -> Router {
    Router::new().route("/api/providers", get(lookup_provider))
}
