//! Configuration for the Extractor

use rackscout_llm::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Generation settings for the two kinds of backend call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Output token budget for classification (a single word is expected)
    pub classify_max_tokens: u32,

    /// Sampling temperature for classification
    pub classify_temperature: f32,

    /// Output token budget for attribute extraction
    pub extract_max_tokens: u32,

    /// Sampling temperature for attribute extraction
    pub extract_temperature: f32,

    /// Upper bound on a single backend call (seconds)
    pub call_timeout_secs: u64,

    /// System message sent with extraction calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_system_prompt: Option<String>,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.classify_max_tokens == 0 {
            return Err("classify_max_tokens must be greater than 0".to_string());
        }
        if self.extract_max_tokens == 0 {
            return Err("extract_max_tokens must be greater than 0".to_string());
        }
        for (name, value) in [
            ("classify_temperature", self.classify_temperature),
            ("extract_temperature", self.extract_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(format!("{} must be within [0.0, 2.0], got {}", name, value));
            }
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Deterministic preset: zero temperature, tighter budgets
    pub fn strict() -> Self {
        Self {
            classify_max_tokens: 5,
            classify_temperature: 0.0,
            extract_max_tokens: 512,
            extract_temperature: 0.0,
            call_timeout_secs: 30,
            extract_system_prompt: None,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            classify_max_tokens: 10,
            classify_temperature: 0.1,
            extract_max_tokens: 1024,
            extract_temperature: 0.1,
            call_timeout_secs: 120,
            extract_system_prompt: None,
        }
    }
}

/// Backend plus extractor settings, as read from one TOML file
///
/// ```toml
/// [backend]
/// kind = "anthropic"
/// model = "claude-3-5-haiku-latest"
///
/// [extractor]
/// classify_max_tokens = 10
/// classify_temperature = 0.1
/// extract_max_tokens = 1024
/// extract_temperature = 0.1
/// call_timeout_secs = 120
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Which provider to use and how to reach it
    #[serde(default)]
    pub backend: BackendConfig,

    /// Generation settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl PipelineConfig {
    /// Validate both sections
    pub fn validate(&self) -> Result<(), String> {
        self.backend.validate().map_err(|e| format!("backend: {}", e))?;
        self.extractor.validate().map_err(|e| format!("extractor: {}", e))
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
