//! Chat endpoint
//!
//! Grounds the assistant in the user's uploaded plan documents: the
//! query is embedded, the most similar chunks are selected, and the
//! excerpts go in as a second system message. Both the embedding call
//! and the completion are handed to usage accounting without blocking
//! the response.

use crate::error::{ApiError, ApiResult};
use crate::middleware::{enforce, RateLimitTier, RequireAuth};
use crate::rag::{build_context_block, select_context, TOP_K_DOCUMENTS};
use crate::server::state::AppState;
use aegis_core::usage::{ApiCall, Endpoint};
use aegis_llm::{ChatMessage, ChatRequest, EMBEDDING_MODEL, SYSTEM_PROMPT};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Deserialize)]
struct ChatBody {
    message: String,
    /// Prior turns of the conversation, oldest first
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    model: String,
    /// File names of the documents the answer drew on
    source_documents: Vec<String>,
}

async fn chat(
    RequireAuth(ctx): RequireAuth,
    Extension(state): Extension<AppState>,
    Json(body): Json<ChatBody>,
) -> ApiResult<Json<ChatResponse>> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    enforce(
        &state.limiter,
        &state.limits,
        &ctx.user_id,
        RateLimitTier::Chat,
    )
    .await?;

    let chunks = state.documents.chunks_for_user(&ctx.user_id).await?;

    let mut context_block = String::new();
    let mut source_documents: Vec<String> = Vec::new();

    if chunks.iter().any(|c| c.embedding.is_some()) {
        let started = Instant::now();
        let query_embedding = state.llm.embed(message).await?;
        state.usage.log(ApiCall {
            endpoint: Endpoint::Embedding,
            model: EMBEDDING_MODEL.to_string(),
            input_tokens: query_embedding.usage.prompt_tokens,
            output_tokens: 0,
            duration_ms: Some(started.elapsed().as_millis() as u64),
            user_id: Some(ctx.user_id.clone()),
            metadata: None,
        });

        let selected = select_context(&chunks, &query_embedding.vector, TOP_K_DOCUMENTS);
        context_block = build_context_block(&selected);
        for chunk in &selected {
            if !source_documents.contains(&chunk.file_name) {
                source_documents.push(chunk.file_name.clone());
            }
        }
    }

    let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
    if !context_block.is_empty() {
        messages.push(ChatMessage::system(context_block));
    }
    messages.extend(body.history);
    messages.push(ChatMessage::user(message));

    let started = Instant::now();
    let completion = state.llm.chat(ChatRequest::new(messages)).await?;

    state.usage.log(ApiCall {
        endpoint: Endpoint::Chat,
        model: completion.model.clone(),
        input_tokens: completion.usage.prompt_tokens,
        output_tokens: completion.usage.completion_tokens,
        duration_ms: Some(started.elapsed().as_millis() as u64),
        user_id: Some(ctx.user_id),
        metadata: Some(serde_json::json!({
            "source_documents": source_documents.len(),
        })),
    });

    Ok(Json(ChatResponse {
        reply: completion.content,
        model: completion.model,
        source_documents,
    }))
}

/// Create chat routes
pub fn routes() -> Router {
    Router::new().route("/api/chat", post(chat))
}
