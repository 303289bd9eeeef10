use crate::llm::Provider;
use serde_json::Value;
use thiserror::Error;

/// Ways an upstream completion call can fail.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider:?} API key is not configured")]
    MissingCredential { provider: Provider },

    #[error("{provider:?} request failed: {detail}")]
    Unavailable { provider: Provider, detail: String },

    #[error("{provider:?} returned status={status}")]
    Status {
        provider: Provider,
        status: u16,
        body: Value,
    },

    #[error("{provider:?} response was malformed: {detail}")]
    Malformed { provider: Provider, detail: String },
}

impl LlmError {
    /// Upstream payload worth surfacing to callers, if the upstream sent one.
    pub fn upstream_body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
