//! Audio transcription endpoint

use crate::error::{ApiError, ApiResult};
use crate::middleware::{enforce, RateLimitTier, RequireAuth};
use crate::server::state::AppState;
use aegis_core::usage::{ApiCall, Endpoint};
use aegis_llm::TRANSCRIPTION_MODEL;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::time::Instant;

/// Body cap for audio uploads: whisper takes up to 25MB
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct TranscribeResponse {
    text: String,
}

async fn transcribe(
    RequireAuth(ctx): RequireAuth,
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<TranscribeResponse>> {
    enforce(
        &state.limiter,
        &state.limits,
        &ctx.user_id,
        RateLimitTier::Transcription,
    )
    .await?;

    let mut audio: Option<Vec<u8>> = None;
    let mut file_name = "audio.webm".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("audio") {
            if let Some(name) = field.file_name() {
                file_name = name.to_string();
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            audio = Some(bytes.to_vec());
        }
    }

    let audio = audio.ok_or_else(|| ApiError::BadRequest("No audio file provided".to_string()))?;
    if audio.is_empty() {
        return Err(ApiError::BadRequest("audio file is empty".to_string()));
    }

    let audio_size_bytes = audio.len();
    let started = Instant::now();
    let transcription = state.llm.transcribe(audio, &file_name).await?;

    state.usage.log(ApiCall {
        endpoint: Endpoint::Transcription,
        model: TRANSCRIPTION_MODEL.to_string(),
        input_tokens: transcription.estimated_tokens,
        output_tokens: 0,
        duration_ms: Some(started.elapsed().as_millis() as u64),
        user_id: Some(ctx.user_id),
        metadata: Some(serde_json::json!({
            "audio_size_bytes": audio_size_bytes,
        })),
    });

    Ok(Json(TranscribeResponse {
        text: transcription.text,
    }))
}

/// Create transcription routes
pub fn routes() -> Router {
    Router::new()
        .route("/api/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES))
}
