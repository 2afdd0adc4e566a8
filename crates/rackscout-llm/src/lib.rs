//! Rackscout LLM Backend Layer
//!
//! Interchangeable text-generation backends behind one capability trait.
//!
//! # Architecture
//!
//! Every provider wire protocol gets one concrete type implementing
//! [`Backend`]. Callers pick an adapter once, from configuration, and then
//! only ever talk to the trait.
//!
//! # Backends
//!
//! - `OllamaBackend`: Local generation server (`/api/generate`)
//! - `AnthropicBackend`: Vendor messages API (`/v1/messages`)
//! - `OpenAiBackend`: Vendor chat-completions API (`/chat/completions`)
//! - `MockBackend`: Deterministic mock for testing
//!
//! # Examples
//!
//! ```
//! use rackscout_llm::{Backend, GenerationRequest, MockBackend};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new("ram");
//! let request = GenerationRequest::new("Classify: 32GB DDR4 ECC").max_tokens(10);
//! let response = backend.generate(&CancellationToken::new(), &request).await.unwrap();
//! assert_eq!(response.content, "ram");
//! # });
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;
mod transport;

#[cfg(test)]
mod test_server;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use anthropic::AnthropicBackend;
pub use config::{build_backend, BackendConfig, BackendKind};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Errors that can occur during generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Local precondition failed before any network call (e.g. missing API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider answered with a non-success status
    #[error("Provider error (HTTP {status}): {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Extracted provider error text, or the raw response body
        message: String,
    },

    /// Success response body was not in the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider returned zero content items
    #[error("Empty response from provider")]
    EmptyResponse,

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// The transport timeout elapsed
    #[error("Request timed out")]
    Timeout,
}

/// Output format hint for a generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Free-form text
    #[default]
    Text,
    /// The provider must answer with a JSON object
    Json,
}

/// A single generation call
///
/// A temperature of zero and a token budget of zero mean "provider default";
/// adapters leave the corresponding wire fields out.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// User prompt text
    pub prompt: String,

    /// Optional system message
    pub system: Option<String>,

    /// Output format hint
    pub format: OutputFormat,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output tokens
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Create a free-text request with provider defaults
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            format: OutputFormat::Text,
            temperature: 0.0,
            max_tokens: 0,
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Require JSON output
    pub fn json(mut self) -> Self {
        self.format = OutputFormat::Json;
        self
    }

    /// Set sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token budget
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether JSON output was requested
    pub fn wants_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Temperature to put on the wire, if any
    pub(crate) fn wire_temperature(&self) -> Option<f32> {
        (self.temperature > 0.0).then_some(self.temperature)
    }

    /// Token budget to put on the wire, if any
    pub(crate) fn wire_max_tokens(&self) -> Option<u32> {
        (self.max_tokens > 0).then_some(self.max_tokens)
    }
}

/// Token usage counters; zero when the provider does not report them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens generated
    pub completion_tokens: u32,
    /// Prompt plus completion
    pub total_tokens: u32,
}

impl Usage {
    /// Build usage from prompt and completion counts
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Uniform result of a generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    /// Generated text
    pub content: String,

    /// Model identifier reported by the provider
    pub model: String,

    /// Token usage (best effort)
    pub usage: Usage,
}

/// A text-generation provider
///
/// Implementations are stateless after construction and shared freely
/// across concurrent calls.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run one generation call
    ///
    /// Must return [`LlmError::Cancelled`] promptly once `cancel` fires,
    /// abandoning any in-flight request.
    async fn generate(
        &self,
        cancel: &CancellationToken,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, LlmError>;

    /// Short identity of the backend, e.g. `"ollama"`
    fn name(&self) -> &str;
}
