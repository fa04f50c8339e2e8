/// LLM Client — the single point of entry for all chat-completion calls.
///
/// No other module talks to the provider directly. Requests go to an ordered
/// list of candidate endpoints (see [`fallback`]); each endpoint gets one attempt
/// bounded by the configured timeout.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmSettings;

pub mod fallback;

use fallback::{EndpointFallback, FallbackError};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no LLM endpoints configured")]
    NoEndpoints,

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<FallbackError<LlmError>> for LlmError {
    fn from(err: FallbackError<LlmError>) -> Self {
        err.into_last().unwrap_or(LlmError::NoEndpoints)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Token accounting. Gateways report different subsets, so every count is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl ChatResponse {
    /// Content of the first choice, if the provider returned any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Anything that can turn a system + user prompt into a chat completion.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError>;
}

/// Chat-completion client with ordered endpoint fallback.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    fallback: EndpointFallback,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(api_key: String, settings: &LlmSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(settings.timeout).build()?,
            api_key,
            fallback: EndpointFallback::new(settings.endpoints.clone()),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoints(&self) -> &[String] {
        self.fallback.endpoints()
    }

    /// One POST to one endpoint. Returns the raw body on a 2xx status.
    async fn post_once(&self, url: String, body: Bytes) -> Result<Bytes, LlmError> {
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        // Serialized once so every endpoint receives byte-identical bodies.
        let body = Bytes::from(serde_json::to_vec(&request)?);

        let raw = self
            .fallback
            .run(|endpoint| self.post_once(endpoint.to_string(), body.clone()))
            .await?;

        let response: ChatResponse = serde_json::from_slice(&raw)?;
        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                total_tokens = ?usage.total_tokens,
                "LLM call succeeded"
            );
        }
        Ok(response)
    }
}
