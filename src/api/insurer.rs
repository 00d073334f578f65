//! Insurer detection endpoint
//!
//! Scans the text of the user's processed documents for known insurer
//! keywords and returns the matching directory entry with its
//! provider-finder link.

use crate::error::ApiResult;
use crate::middleware::RequireAuth;
use crate::server::state::AppState;
use aegis_core::insurer::detect_insurer;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct InsurerResponse {
    insurer: Option<DetectedInsurer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct DetectedInsurer {
    id: &'static str,
    name: &'static str,
    finder_url: &'static str,
}

async fn user_insurer(
    RequireAuth(ctx): RequireAuth,
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<InsurerResponse>> {
    let texts = state.documents.texts_for_user(&ctx.user_id).await?;

    if texts.is_empty() {
        return Ok(Json(InsurerResponse {
            insurer: None,
            reason: Some("no_documents"),
        }));
    }

    match detect_insurer(&texts) {
        Some(insurer) => Ok(Json(InsurerResponse {
            insurer: Some(DetectedInsurer {
                id: insurer.id,
                name: insurer.name,
                finder_url: insurer.finder_url,
            }),
            reason: None,
        })),
        None => Ok(Json(InsurerResponse {
            insurer: None,
            reason: Some("not_detected"),
        })),
    }
}

/// Create insurer routes
pub fn routes() -> Router {
    Router::new().route("/api/user/insurer", get(user_insurer))
}
