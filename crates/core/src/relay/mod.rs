pub mod classify;
pub mod prompt;

use crate::config::Settings;
use crate::domain::contract::{AdviceRequest, AdviceResult, AnalysisRequest, AnalysisResult};
use crate::llm::error::LlmError;
use crate::llm::openai::OpenAiClient;
use crate::llm::{CompletionClient, CompletionRequest};
use classify::ChartPolicy;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request body: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upstream(#[from] LlmError),
}

impl RelayError {
    /// Diagnostic payload for callers: the upstream error body when there is one,
    /// otherwise this error's message.
    pub fn details(&self) -> Value {
        match self {
            Self::Upstream(err) => err
                .upstream_body()
                .cloned()
                .unwrap_or_else(|| Value::String(err.to_string())),
            Self::InvalidInput(_) => Value::String(self.to_string()),
        }
    }
}

/// Translates caller requests into one upstream completion each.
#[derive(Clone)]
pub struct RelayService {
    client: Arc<dyn CompletionClient>,
    analyze_max_tokens: u32,
    advice_max_tokens: u32,
    chart_policy: ChartPolicy,
}

impl RelayService {
    pub fn new(client: Arc<dyn CompletionClient>, settings: &Settings) -> Self {
        Self {
            client,
            analyze_max_tokens: settings.analyze_max_tokens,
            advice_max_tokens: settings.advice_max_tokens,
            chart_policy: settings.chart_policy,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = OpenAiClient::from_settings(settings)?;
        Ok(Self::new(Arc::new(client), settings))
    }

    pub async fn analyze(&self, req: &AnalysisRequest) -> Result<AnalysisResult, RelayError> {
        let text = self
            .client
            .complete(CompletionRequest {
                parts: prompt::analyze_parts(req.image_url.as_ref()),
                max_tokens: self.analyze_max_tokens,
            })
            .await?;

        Ok(AnalysisResult::new(
            self.chart_policy.is_chart(&text),
            classify::extract_timeframe(&text),
        ))
    }

    pub async fn advise(&self, req: &AdviceRequest) -> Result<AdviceResult, RelayError> {
        let advice = self
            .client
            .complete(CompletionRequest {
                parts: prompt::advice_parts(req),
                max_tokens: self.advice_max_tokens,
            })
            .await?;

        Ok(AdviceResult { advice })
    }
}

impl std::fmt::Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("provider", &self.client.provider())
            .field("analyze_max_tokens", &self.analyze_max_tokens)
            .field("advice_max_tokens", &self.advice_max_tokens)
            .field("chart_policy", &self.chart_policy)
            .finish()
    }
}
