//! Core Extractor implementation

use crate::config::{ExtractorConfig, PipelineConfig};
use crate::error::ExtractorError;
use crate::parser::parse_extraction_response;
use crate::prompt::{ItemSpecifics, TemplateRegistry, EXTRACTION_SYSTEM_PROMPT};
use crate::speed::normalize_ram_speed;
use crate::validator::validate_extraction;
use rackscout_domain::{AttributeRecord, ComponentCategory};
use rackscout_llm::{build_backend, Backend, GenerationRequest};
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Classifies listing titles and extracts validated attribute records
///
/// Holds no per-call state: one instance can serve any number of concurrent
/// calls. Every operation takes the caller's [`CancellationToken`]; cancelling
/// it aborts the in-flight backend call.
pub struct Extractor<B: Backend + ?Sized = dyn Backend> {
    backend: Arc<B>,
    templates: TemplateRegistry,
    config: ExtractorConfig,
}

impl Extractor {
    /// Build the backend named in `config` and wrap it in an Extractor
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let backend = build_backend(&config.backend)?;
        Ok(Self::new(backend, config.extractor.clone()))
    }
}

impl<B: Backend + ?Sized> Extractor<B> {
    /// Create a new Extractor
    pub fn new(backend: Arc<B>, config: ExtractorConfig) -> Self {
        Self {
            backend,
            templates: TemplateRegistry::new(),
            config,
        }
    }

    /// Identity of the backend in use
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Current configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Assign a listing title to one of the six categories
    ///
    /// The backend's answer is trimmed and lower-cased before lookup; anything
    /// else fails with [`ExtractorError::InvalidCategory`].
    pub async fn classify(
        &self,
        cancel: &CancellationToken,
        title: &str,
    ) -> Result<ComponentCategory, ExtractorError> {
        let request = GenerationRequest::new(self.templates.render_classify_prompt(title))
            .temperature(self.config.classify_temperature)
            .max_tokens(self.config.classify_max_tokens);

        let answer = self.call_backend(cancel, request).await?;

        match ComponentCategory::parse(&answer) {
            Some(category) => {
                info!("Classified {:?} as {}", title, category);
                Ok(category)
            }
            None => {
                warn!("Classifier returned unrecognized category {:?}", answer);
                Err(ExtractorError::InvalidCategory(answer))
            }
        }
    }

    /// Extract and validate attributes for a listing of a known category
    ///
    /// For `ram`, a missing speed is then recovered from the title when
    /// possible; that step never fails the call.
    pub async fn extract(
        &self,
        cancel: &CancellationToken,
        category: ComponentCategory,
        title: &str,
        specifics: &ItemSpecifics,
    ) -> Result<AttributeRecord, ExtractorError> {
        let prompt = self
            .templates
            .render_extract_prompt(category, title, specifics)
            .map_err(|e| rendering(category, e))?;

        self.run_extraction(cancel, category, title, prompt).await
    }

    /// Like [`Extractor::extract`], also passing the listing description
    ///
    /// Only the server template uses the description.
    pub async fn extract_with_description(
        &self,
        cancel: &CancellationToken,
        category: ComponentCategory,
        title: &str,
        specifics: &ItemSpecifics,
        description: &str,
    ) -> Result<AttributeRecord, ExtractorError> {
        let rendered = match category {
            ComponentCategory::Server => {
                self.templates
                    .render_server_extract_prompt(title, specifics, description)
            }
            _ => self.templates.render_extract_prompt(category, title, specifics),
        };
        let prompt = rendered.map_err(|e| rendering(category, e))?;

        self.run_extraction(cancel, category, title, prompt).await
    }

    /// Classify, then extract with the resulting category
    ///
    /// A classification failure is wrapped in [`ExtractorError::Classifying`]
    /// and no extraction call is made. An extraction failure is wrapped in
    /// [`ExtractorError::Extracting`], which still carries the category.
    pub async fn classify_and_extract(
        &self,
        cancel: &CancellationToken,
        title: &str,
        specifics: &ItemSpecifics,
    ) -> Result<(ComponentCategory, AttributeRecord), ExtractorError> {
        let category = self
            .classify(cancel, title)
            .await
            .map_err(|e| ExtractorError::Classifying(Box::new(e)))?;

        let record = self
            .extract(cancel, category, title, specifics)
            .await
            .map_err(|e| ExtractorError::Extracting {
                category,
                source: Box::new(e),
            })?;

        Ok((category, record))
    }

    async fn run_extraction(
        &self,
        cancel: &CancellationToken,
        category: ComponentCategory,
        title: &str,
        prompt: String,
    ) -> Result<AttributeRecord, ExtractorError> {
        let system = self
            .config
            .extract_system_prompt
            .as_deref()
            .unwrap_or(EXTRACTION_SYSTEM_PROMPT);

        let request = GenerationRequest::new(prompt)
            .system(system)
            .json()
            .temperature(self.config.extract_temperature)
            .max_tokens(self.config.extract_max_tokens);

        let response = self.call_backend(cancel, request).await?;
        let record = parse_extraction_response(&response)?;

        let mut record = validate_extraction(category, record).map_err(|e| {
            warn!("Extracted {} record failed validation: {}", category, e);
            ExtractorError::Validating(e)
        })?;

        if category == ComponentCategory::Ram && normalize_ram_speed(&mut record, title) {
            debug!("Backfilled speed_mhz from title");
        }

        info!("Extracted {} record with {} fields", category, record.len());
        Ok(record)
    }

    /// One backend call, bounded by the configured per-call timeout
    async fn call_backend(
        &self,
        cancel: &CancellationToken,
        request: GenerationRequest,
    ) -> Result<String, ExtractorError> {
        debug!(
            "Calling {} backend, prompt length: {} chars",
            self.backend.name(),
            request.prompt.len()
        );

        let response = timeout(
            self.config.call_timeout(),
            self.backend.generate(cancel, &request),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.config.call_timeout_secs))??;

        debug!(
            "Response length: {} chars, {} tokens",
            response.content.len(),
            response.usage.total_tokens
        );
        Ok(response.content)
    }
}

fn rendering(category: ComponentCategory, source: ExtractorError) -> ExtractorError {
    ExtractorError::Rendering {
        category,
        source: Box::new(source),
    }
}
