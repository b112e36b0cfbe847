use crate::config::ProxyConfig;
use crate::error::{ExplorerError, Result};
use crate::types::{ItineraryRequest, RawModelResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Boundary to the chat-completion proxy. Implementations return the raw
/// content string; interpreting it is the normalizer's job.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &ItineraryRequest) -> Result<RawModelResponse>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<Value>,
    /// Some OpenRouter models put their usable text here instead.
    reasoning: Option<Value>,
}

/// Client for the OpenRouter chat-completions proxy. The proxy normally
/// injects credentials server-side; when `OPENROUTER_API_KEY` is present the
/// client talks to the provider directly with a bearer token.
pub struct OpenRouterClient {
    http: reqwest::Client,
    config: ProxyConfig,
    api_key: Option<String>,
}

impl OpenRouterClient {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let api_key = std::env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(Self {
            http,
            config,
            api_key,
        })
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Pull the raw text out of a chat-completion response body: `content` of
/// the first choice, falling back to `reasoning` for models that only
/// populate the latter.
fn extract_raw_text(parsed: ChatCompletionResponse) -> Result<RawModelResponse> {
    let message = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .ok_or(ExplorerError::EmptyResponse)?;
    message
        .content
        .as_ref()
        .and_then(value_as_text)
        .or_else(|| message.reasoning.as_ref().and_then(value_as_text))
        .ok_or(ExplorerError::EmptyResponse)
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    #[instrument(skip(self, request), fields(destination = %request.destination_id))]
    async fn complete(&self, request: &ItineraryRequest) -> Result<RawModelResponse> {
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Requesting itinerary for '{}'", request.destination_name);
        let mut http_request = self.http.post(&self.config.url).json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }
        let response = http_request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Proxy returned status {} for '{}'", status, request.destination_id);
            return Err(ExplorerError::Network {
                status: status.as_u16(),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        extract_raw_text(parsed)
    }
}
