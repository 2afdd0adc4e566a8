//! Anthropic Messages API backend
//!
//! Posts to `/v1/messages` with `x-api-key` and `anthropic-version` headers.
//! The API key is checked locally before any request goes out.

use crate::transport;
use crate::{Backend, GenerationRequest, GenerationResponse, LlmError, Usage};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default Messages API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default `anthropic-version` header value
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory on this API; used when the request leaves it unset
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Environment variable consulted by [`AnthropicBackend::from_env`]
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Messages API backend
#[derive(Debug)]
pub struct AnthropicBackend {
    base_url: String,
    api_key: SecretBox<str>,
    api_version: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicBackend {
    /// Create a backend with an explicit API key
    ///
    /// An empty key is accepted here and rejected on the first call.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretBox::new(Box::from(api_key.into().as_str())),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable
    pub fn from_env(model: impl Into<String>) -> Self {
        Self::new(std::env::var(API_KEY_ENV).unwrap_or_default(), model)
    }

    /// Set a custom base URL (proxies, gateways)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the `anthropic-version` header
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.wire_max_tokens().unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.wire_temperature(),
        }
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LlmError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(LlmError::Config(format!(
                "anthropic API key is not set (pass one or export {})",
                API_KEY_ENV
            )));
        }

        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_body(request);

        debug!("anthropic messages: model {}, prompt {} chars", self.model, request.prompt.len());

        let http = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", self.api_version.as_str())
            .json(&body);

        let raw = transport::send(cancel, self.name(), http).await?;
        let decoded: MessagesResponse = transport::decode(self.name(), &raw)?;

        if decoded.content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let content: String = decoded
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();
        if content.is_empty() {
            warn!("anthropic response carried no text blocks");
        }

        let usage = decoded
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        Ok(GenerationResponse {
            content,
            model: decoded.model,
            usage,
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
