//! OpenAI-compatible API client
//!
//! Plain reqwest JSON client for the three endpoints the assistant uses:
//! chat completions, audio transcriptions and embeddings. Responses carry
//! token usage so the caller can feed the accounting layer.

use crate::error::{sanitize_api_error, Error, Result};
use crate::message::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

/// Embedding model; produces 1536-dimensional vectors
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Transcription model
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default sampling temperature for chat
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default completion token cap for chat
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Request timeout
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Configuration for the API client
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key for authentication
    pub api_key: String,
    /// API base URL (override for proxies)
    pub base_url: String,
    /// Default model for chat completions
    pub chat_model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Create a configuration with the given API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }

    /// Create configuration from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `OPENAI_MODEL` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::ApiKeyMissing` when `OPENAI_API_KEY` is unset;
    /// without it every assistant feature fails, so surface it at startup.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::ApiKeyMissing {
            provider: "openai".to_string(),
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.chat_model = model;
        }
        Ok(config)
    }
}

/// Token usage reported by the API
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,
}

/// A chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Conversation messages, system prompt first
    pub messages: Vec<ChatMessage>,
    /// Model override (defaults to the configured chat model)
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token cap
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Create a request with default sampling parameters
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A completed chat response
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Assistant reply text
    pub content: String,
    /// Model that produced the reply
    pub model: String,
    /// Token usage for accounting
    pub usage: TokenUsage,
}

/// A completed transcription
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Rough token estimate (chars / 4) for accounting; the API does not
    /// report usage for audio
    pub estimated_tokens: u32,
}

/// A computed embedding
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Embedding vector (1536 dimensions for ada-002)
    pub vector: Vec<f32>,
    /// Token usage for accounting
    pub usage: TokenUsage,
}

// Wire types

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Serialize)]
struct EmbeddingBody<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// The API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// The configured default chat model
    #[must_use]
    pub fn chat_model(&self) -> &str {
        &self.config.chat_model
    }

    /// Generate a chat completion
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatCompletion> {
        let model = request.model.as_deref().unwrap_or(&self.config.chat_model);
        let body = ChatCompletionBody {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let parsed: ChatCompletionResponse = response.json().await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::InvalidResponse("completion had no choices".to_string()))?;

        let usage = parsed.usage.unwrap_or_default();
        debug!(
            model = %parsed.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat completion finished"
        );

        Ok(ChatCompletion {
            content,
            model: parsed.model,
            usage,
        })
    }

    /// Transcribe audio to English text
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<Transcription> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", "en");

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let parsed: TranscriptionResponse = response.json().await?;

        let estimated_tokens = parsed.text.len().div_ceil(4) as u32;
        Ok(Transcription {
            text: parsed.text,
            estimated_tokens,
        })
    }

    /// Generate an embedding vector for the given text
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let body = EmbeddingBody {
            model: EMBEDDING_MODEL,
            input: text,
        };

        let response = self
            .http
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let parsed: EmbeddingResponse = response.json().await?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::InvalidResponse("embedding response had no data".to_string()))?;

        Ok(Embedding {
            vector,
            usage: parsed.usage.unwrap_or_default(),
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = sanitize_api_error(&raw);
        warn!(status = status.as_u16(), message = %message, "api request failed");
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatMessage;

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAiConfig::new("sk-secret-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_chat_request_defaults() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 2000);
        assert!(request.model.is_none());
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Your copay is $45."}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 320, "completion_tokens": 12, "total_tokens": 332}
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.model, "gpt-4o");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Your copay is $45.")
        );
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 320);
        assert_eq!(usage.completion_tokens, 12);
    }

    #[test]
    fn test_chat_response_parsing_without_usage() {
        let json = r#"{"model": "gpt-4o", "choices": []}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.usage.is_none());
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn test_embedding_response_parsing() {
        let json = r#"{
            "data": [{"index": 0, "embedding": [0.1, -0.2, 0.3]}],
            "model": "text-embedding-ada-002",
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;

        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding.len(), 3);
        assert_eq!(parsed.usage.unwrap().prompt_tokens, 8);
    }

    #[test]
    fn test_transcription_token_estimate() {
        let text = "a".repeat(10);
        let estimated = text.len().div_ceil(4) as u32;
        assert_eq!(estimated, 3);
    }
}
