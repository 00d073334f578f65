//! HTTP API for the Aegis server
//!
//! Route modules, one per surface:
//! - health: liveness
//! - auth: register, login, password reset
//! - chat: the assistant
//! - transcribe: speech-to-text
//! - documents: plan-document upload and listing
//! - insurer: insurer detection from uploaded documents
//! - providers: NPI registry lookup
//! - admin: usage dashboard

pub mod admin;
pub mod auth;
pub mod chat;
pub mod documents;
pub mod health;
pub mod insurer;
pub mod providers;
pub mod transcribe;


use crate::server::state::AppState;
use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(chat::routes())
        .merge(transcribe::routes())
        .merge(documents::routes())
        .merge(insurer::routes())
        .merge(providers::routes())
        .merge(admin::routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
