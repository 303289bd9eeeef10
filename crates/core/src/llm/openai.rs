use crate::config::Settings;
use crate::llm::error::LlmError;
use crate::llm::{CompletionClient, CompletionRequest, ContentPart, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// The API key may be absent here; it is only required once a request is sent.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.openai_timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key: settings.openai_api_key.clone(),
            base_url: settings.openai_base_url.clone(),
            model: settings.openai_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{CHAT_COMPLETIONS_PATH}",
            self.base_url.trim_end_matches('/')
        )
    }

    fn build_request(&self, req: CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: req.parts,
            }],
            max_tokens: req.max_tokens,
        }
    }

    fn first_choice_text(res: ChatCompletionResponse) -> Result<String, LlmError> {
        res.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed {
                provider: Provider::OpenAI,
                detail: "response has no choice text".to_string(),
            })
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredential {
                provider: Provider::OpenAI,
            })?;

        let body = self.build_request(req);
        let max_tokens = body.max_tokens;

        let res = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Unavailable {
                provider: Provider::OpenAI,
                detail: e.to_string(),
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| LlmError::Unavailable {
            provider: Provider::OpenAI,
            detail: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            let body = serde_json::from_str::<serde_json::Value>(&text)
                .unwrap_or(serde_json::Value::String(text));
            return Err(LlmError::Status {
                provider: Provider::OpenAI,
                status: status.as_u16(),
                body,
            });
        }

        let parsed = serde_json::from_str::<ChatCompletionResponse>(&text).map_err(|e| {
            LlmError::Malformed {
                provider: Provider::OpenAI,
                detail: format!("failed to decode response JSON: {e}"),
            }
        })?;

        tracing::debug!(model = %self.model, max_tokens, "OpenAI completion received");
        Self::first_choice_text(parsed)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
