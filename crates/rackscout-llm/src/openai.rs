//! OpenAI-compatible chat-completions backend
//!
//! Works against the vendor API and against self-hosted servers that speak the
//! same protocol (vLLM, llama.cpp, LM Studio). The bearer token is optional for
//! the latter.

use crate::transport;
use crate::{Backend, GenerationRequest, GenerationResponse, LlmError, Usage};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default chat-completions base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted by [`OpenAiBackend::from_env`]
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat-completions backend
#[derive(Debug)]
pub struct OpenAiBackend {
    base_url: String,
    api_key: Option<SecretBox<str>>,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    // Null when the model refuses or only calls tools
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiBackend {
    /// Create a backend without credentials
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create against the vendor API using `OPENAI_API_KEY` if set
    pub fn from_env(model: impl Into<String>) -> Self {
        let backend = Self::new(DEFAULT_BASE_URL, model);
        match std::env::var(API_KEY_ENV) {
            Ok(key) => backend.with_api_key(key),
            Err(_) => backend,
        }
    }

    /// Send `Authorization: Bearer <key>`; an empty key sends nothing
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then(|| SecretBox::new(Box::from(key.as_str())));
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

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.wire_temperature(),
            max_tokens: request.wire_max_tokens(),
            response_format: request.wants_json().then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(request);

        debug!("openai chat: model {}, prompt {} chars", self.model, request.prompt.len());

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key.expose_secret());
        }

        let raw = transport::send(cancel, self.name(), http).await?;
        let decoded: ChatResponse = transport::decode(self.name(), &raw)?;

        let choice = decoded
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        let usage = decoded
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(GenerationResponse {
            content: choice.message.content.unwrap_or_default(),
            model: decoded.model,
            usage,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
