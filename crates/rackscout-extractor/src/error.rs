//! Error types for the Extractor

use rackscout_domain::ComponentCategory;
use rackscout_llm::LlmError;
use thiserror::Error;

/// A record failed category validation
///
/// Validation stops at the first violation, so exactly one field is named.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required field absent, null or empty
    #[error("missing required field '{field}'")]
    MissingField {
        /// Offending field
        field: &'static str,
    },

    /// Numeric field outside its allowed range
    #[error("field '{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Value received
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// String field outside its allowed set
    #[error("field '{field}' has invalid value {value:?} (allowed: {allowed})")]
    InvalidEnum {
        /// Offending field
        field: &'static str,
        /// Value received
        value: String,
        /// Allowed values, comma separated
        allowed: String,
    },

    /// Field present with a JSON type its rule cannot accept
    #[error("field '{field}' must be a {expected}")]
    InvalidType {
        /// Offending field
        field: &'static str,
        /// Expected JSON type
        expected: &'static str,
    },
}

impl ValidationError {
    /// Name of the field that failed
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidEnum { field, .. }
            | ValidationError::InvalidType { field, .. } => field,
        }
    }
}

/// Errors that can occur during classification and extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// No extraction template exists for the category
    #[error("unsupported category: {0}")]
    UnsupportedCategory(ComponentCategory),

    /// Classifier answered with something outside the six categories
    #[error("invalid category from classifier: {0:?}")]
    InvalidCategory(String),

    /// Extracted payload was not a JSON object
    #[error("parsing extraction response: {0}")]
    Parse(String),

    /// Backend call failed
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Backend call exceeded the configured per-call timeout
    #[error("backend call timed out after {0}s")]
    Timeout(u64),

    /// Prompt rendering failed
    #[error("rendering {category} prompt: {source}")]
    Rendering {
        /// Category whose template was requested
        category: ComponentCategory,
        /// Underlying failure
        #[source]
        source: Box<ExtractorError>,
    },

    /// Extracted record failed validation
    #[error("validating extraction: {0}")]
    Validating(#[from] ValidationError),

    /// Classification stage of a combined run failed
    #[error("classifying: {0}")]
    Classifying(#[source] Box<ExtractorError>),

    /// Extraction stage of a combined run failed after classification succeeded
    #[error("extracting: {source}")]
    Extracting {
        /// Category classification produced
        category: ComponentCategory,
        /// Underlying failure
        #[source]
        source: Box<ExtractorError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Strip stage wrappers and return the underlying failure
    pub fn root(&self) -> &ExtractorError {
        match self {
            ExtractorError::Rendering { source, .. }
            | ExtractorError::Extracting { source, .. }
            | ExtractorError::Classifying(source) => source.root(),
            other => other,
        }
    }

    /// Category already determined when a combined run failed during extraction
    pub fn category(&self) -> Option<ComponentCategory> {
        match self {
            ExtractorError::Extracting { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Whether the caller's cancellation token ended the call
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), ExtractorError::Llm(LlmError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        let err = ExtractorError::Extracting {
            category: ComponentCategory::Ram,
            source: Box::new(ExtractorError::Validating(ValidationError::MissingField {
                field: "capacity_gb",
            })),
        };
        assert_eq!(
            err.to_string(),
            "extracting: validating extraction: missing required field 'capacity_gb'"
        );
        assert_eq!(err.category(), Some(ComponentCategory::Ram));
        assert!(matches!(
            err.root(),
            ExtractorError::Validating(ValidationError::MissingField { field: "capacity_gb" })
        ));
    }

    #[test]
    fn test_rendering_label() {
        let err = ExtractorError::Rendering {
            category: ComponentCategory::Other,
            source: Box::new(ExtractorError::UnsupportedCategory(ComponentCategory::Other)),
        };
        assert_eq!(err.to_string(), "rendering other prompt: unsupported category: other");
        assert!(matches!(err.root(), ExtractorError::UnsupportedCategory(ComponentCategory::Other)));
        assert_eq!(err.category(), None);
    }

    #[test]
    fn test_classifying_wraps_llm_error() {
        let err = ExtractorError::Classifying(Box::new(LlmError::Cancelled.into()));
        assert!(err.to_string().starts_with("classifying: "));
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::OutOfRange {
            field: "confidence",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(err.field(), "confidence");
        assert!(err.to_string().contains("1.5"));
    }
}
