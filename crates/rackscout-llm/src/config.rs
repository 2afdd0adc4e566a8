//! Backend selection and connection settings

use crate::{anthropic, ollama, openai};
use crate::{AnthropicBackend, Backend, LlmError, OllamaBackend, OpenAiBackend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Which provider wire protocol to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI-compatible chat completions
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

/// Connection settings for one backend
///
/// # Examples
///
/// ```
/// use rackscout_llm::{BackendConfig, BackendKind};
///
/// let config = BackendConfig::from_toml(r#"
///     kind = "openai"
///     model = "gpt-4o-mini"
///     base_url = "http://localhost:8000/v1"
/// "#).unwrap();
/// assert_eq!(config.kind, BackendKind::OpenAi);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider protocol
    #[serde(default)]
    pub kind: BackendKind,

    /// Model name sent to the provider
    pub model: String,

    /// Base URL; the provider's public default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key; falls back to the provider's environment variable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// HTTP timeout per request (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `anthropic-version` header override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<String>,
}

fn default_timeout_secs() -> u64 {
    60
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("anthropic_version", &self.anthropic_version)
            .finish()
    }
}

impl Default for BackendConfig {
    /// Local Ollama with a small instruction-tuned model
    fn default() -> Self {
        Self {
            kind: BackendKind::Ollama,
            model: "llama3.1:8b".to_string(),
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            anthropic_version: None,
        }
    }
}

impl BackendConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("base_url must be an http(s) URL, got {:?}", url));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    fn resolved_api_key(&self, env_var: &str) -> String {
        self.api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok())
            .unwrap_or_default()
    }
}

/// Construct the adapter named by `config`
///
/// A missing Anthropic key is not an error here; the backend rejects calls
/// until one is supplied.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn Backend>, LlmError> {
    config.validate().map_err(LlmError::Config)?;

    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

    let backend: Arc<dyn Backend> = match config.kind {
        BackendKind::Ollama => Arc::new(
            OllamaBackend::new(
                config.base_url.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT),
                &config.model,
            )
            .with_client(client),
        ),
        BackendKind::Anthropic => {
            let mut backend =
                AnthropicBackend::new(config.resolved_api_key(anthropic::API_KEY_ENV), &config.model)
                    .with_client(client);
            if let Some(url) = &config.base_url {
                backend = backend.with_base_url(url);
            }
            if let Some(version) = &config.anthropic_version {
                backend = backend.with_api_version(version);
            }
            Arc::new(backend)
        }
        BackendKind::OpenAi => Arc::new(
            OpenAiBackend::new(
                config.base_url.as_deref().unwrap_or(openai::DEFAULT_BASE_URL),
                &config.model,
            )
            .with_api_key(config.resolved_api_key(openai::API_KEY_ENV))
            .with_client(client),
        ),
    };

    info!("Using {} backend with model {}", backend.name(), config.model);
    Ok(backend)
}
