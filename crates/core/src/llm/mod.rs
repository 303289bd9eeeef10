pub mod error;
pub mod openai;

use crate::llm::error::LlmError;
use serde::Serialize;
use serde_json::Value;

/// One typed part of a user message. Serializes to the chat-completions
/// `{"type": "text", ...}` / `{"type": "image_url", ...}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    /// Whatever the caller supplied; `null` when absent.
    pub url: Value,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(url: impl Into<Value>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }
}

/// A single-turn user prompt and its output ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub parts: Vec<ContentPart>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
}

#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sends one request and returns the first choice's text. Never retries.
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError>;
}
