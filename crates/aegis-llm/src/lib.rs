//! Aegis LLM - OpenAI-compatible API client
//!
//! Thin client for the external model API used by the assistant:
//! - Client: chat completions, audio transcription, embeddings
//! - Message: conversation message types
//! - Prompt: the assistant system prompt
//! - Error: API error types with sanitized provider messages
//!
//! Every response carries token usage so callers can hand it to the
//! usage accounting layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod message;
pub mod prompt;

pub use client::{
    ChatCompletion, ChatRequest, Embedding, OpenAiClient, OpenAiConfig, TokenUsage, Transcription,
    DEFAULT_CHAT_MODEL, EMBEDDING_MODEL, TRANSCRIPTION_MODEL,
};
pub use error::{Error, Result};
pub use message::{ChatMessage, MessageRole};
pub use prompt::SYSTEM_PROMPT;
