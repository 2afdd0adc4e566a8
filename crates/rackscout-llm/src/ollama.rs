//! Ollama Backend Implementation
//!
//! Talks to a local Ollama server's `/api/generate` endpoint with streaming
//! disabled. Runs fully offline, which makes it the default for development.
//!
//! # Examples
//!
//! ```no_run
//! use rackscout_llm::OllamaBackend;
//!
//! let backend = OllamaBackend::new("http://localhost:11434", "llama3.1:8b");
//! ```

use crate::transport;
use crate::{Backend, GenerationRequest, GenerationResponse, LlmError, Usage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama backend for local inference
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for the generate API
#[derive(Debug, Serialize, PartialEq)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize, PartialEq)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Response from the generate API
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1:8b", "qwen2.5")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a backend against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> OllamaGenerateRequest<'a> {
        let temperature = request.wire_temperature();
        let num_predict = request.wire_max_tokens();
        let options = (temperature.is_some() || num_predict.is_some()).then_some(OllamaOptions {
            temperature,
            num_predict,
        });

        OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            format: request.wants_json().then_some("json"),
            stream: false,
            options,
        }
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = self.build_body(request);

        debug!("ollama generate: model {}, prompt {} chars", self.model, request.prompt.len());

        let raw = transport::send(cancel, self.name(), self.client.post(&url).json(&body)).await?;
        let decoded: OllamaGenerateResponse = transport::decode(self.name(), &raw)?;

        Ok(GenerationResponse {
            content: decoded.response,
            model: decoded.model,
            usage: Usage::new(decoded.prompt_eval_count, decoded.eval_count),
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
