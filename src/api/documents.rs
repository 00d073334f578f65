//! Document upload and listing
//!
//! Upload stores the metadata row and returns immediately; extraction,
//! chunking and embedding run on a detached task that walks the document
//! through `processing` to `completed` or `error`. The task is
//! independent of the request, so an aborted upload response never
//! leaves a document stuck in `processing`.

use crate::error::{ApiError, ApiResult};
use crate::middleware::{enforce, RateLimitTier, RequireAuth};
use crate::server::state::AppState;
use aegis_core::documents::{
    chunk_text, detect_document_type, is_likely_scanned, DocumentRecord, DocumentStatus,
    MAX_FILE_SIZE,
};
use aegis_core::usage::{ApiCall, Endpoint};
use aegis_llm::EMBEDDING_MODEL;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};
use std::time::Instant;
use tracing::{info, warn};

async fn upload(
    RequireAuth(ctx): RequireAuth,
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<DocumentRecord>)> {
    enforce(
        &state.limiter,
        &state.limits,
        &ctx.user_id,
        RateLimitTier::General,
    )
    .await?;

    let mut data: Option<Vec<u8>> = None;
    let mut file_name = "document.pdf".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                file_name = name.to_string();
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            data = Some(bytes.to_vec());
        }
    }

    let data = data.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("file is empty".to_string()));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "File too large ({}MB). Maximum size is {}MB.",
            data.len() / 1024 / 1024,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let doc_type = detect_document_type(&file_name);
    let record = state
        .documents
        .insert(&ctx.user_id, &file_name, doc_type)
        .await?;

    info!(document_id = %record.id, file_name = %file_name, "document uploaded");

    // Fire and forget; status is tracked in the database
    let task_state = state.clone();
    let document_id = record.id.clone();
    let user_id = ctx.user_id.clone();
    tokio::spawn(async move {
        process_document(task_state, document_id, user_id, file_name, data).await;
    });

    Ok((StatusCode::ACCEPTED, Json(record)))
}

async fn list(
    RequireAuth(ctx): RequireAuth,
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<DocumentRecord>>> {
    let documents = state.documents.list_for_user(&ctx.user_id).await?;
    Ok(Json(documents))
}

/// Walk an uploaded document through extraction, chunking and embedding.
/// Failures mark the document `error`; nothing propagates.
async fn process_document(
    state: AppState,
    document_id: String,
    user_id: String,
    file_name: String,
    data: Vec<u8>,
) {
    if let Err(err) = run_processing(&state, &document_id, &user_id, &file_name, &data).await {
        warn!(document_id = %document_id, error = %err, "document processing failed");
        if let Err(status_err) = state
            .documents
            .set_status(&document_id, DocumentStatus::Error)
            .await
        {
            warn!(document_id = %document_id, error = %status_err, "failed to mark document error");
        }
    }
}

async fn run_processing(
    state: &AppState,
    document_id: &str,
    user_id: &str,
    file_name: &str,
    data: &[u8],
) -> anyhow::Result<()> {
    state
        .documents
        .set_status(document_id, DocumentStatus::Processing)
        .await?;

    let text = state.extractor.extract(file_name, data).await?;
    if is_likely_scanned(Some(&text)) {
        anyhow::bail!(
            "could not extract text; the document may be a scanned image or empty"
        );
    }

    state.documents.set_raw_text(document_id, &text).await?;

    let chunks = chunk_text(&text);
    let mut stored = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let started = Instant::now();
        let embedding = state.llm.embed(&chunk).await?;
        state.usage.log(ApiCall {
            endpoint: Endpoint::Embedding,
            model: EMBEDDING_MODEL.to_string(),
            input_tokens: embedding.usage.prompt_tokens,
            output_tokens: 0,
            duration_ms: Some(started.elapsed().as_millis() as u64),
            user_id: Some(user_id.to_string()),
            metadata: Some(serde_json::json!({"document_id": document_id})),
        });
        stored.push((chunk, Some(embedding.vector)));
    }

    state.documents.replace_chunks(document_id, &stored).await?;
    state
        .documents
        .set_status(document_id, DocumentStatus::Completed)
        .await?;

    info!(document_id = %document_id, chunks = stored.len(), "document processed");
    Ok(())
}

/// Create document routes
pub fn routes() -> Router {
    Router::new()
        .route("/api/documents", post(upload).get(list))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
}
