//! Rackscout Extractor
//!
//! Turns free-text marketplace listing titles into validated, category-specific
//! attribute records using an LLM backend.
//!
//! # Architecture
//!
//! ```text
//! Title → classify → render prompt → Backend → parse → validate → speed backfill → record
//! ```
//!
//! # Key Features
//!
//! - **Classification**: Assign a title to ram, drive, server, cpu, nic or other
//! - **Extraction**: One prompt and one validation schema per category
//! - **Normalization**: Condition phrasing and enum spellings are made canonical
//! - **Speed Recovery**: RAM speed is backfilled from PC-module codes in the title
//! - **Provider Independence**: Any [`rackscout_llm::Backend`] can drive the pipeline
//!
//! # Example Usage
//!
//! ```no_run
//! use rackscout_domain::product_key;
//! use rackscout_extractor::{Extractor, ItemSpecifics, PipelineConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load("rackscout.toml")?;
//! let extractor = Extractor::from_config(&config)?;
//!
//! let cancel = CancellationToken::new();
//! let (category, record) = extractor
//!     .classify_and_extract(&cancel, "Samsung 32GB 2Rx4 PC4-21300 ECC REG", &ItemSpecifics::new())
//!     .await?;
//!
//! println!("{} -> {}", category, product_key(category.as_str(), &record));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod speed;
mod validator;


pub use config::{ExtractorConfig, PipelineConfig};
pub use error::{ExtractorError, ValidationError};
pub use extractor::Extractor;
pub use parser::parse_extraction_response;
pub use prompt::{format_specifics, ItemSpecifics, TemplateRegistry, EXTRACTION_SYSTEM_PROMPT};
pub use speed::{extract_speed_from_title, normalize_ram_speed, pc_module_to_mhz};
pub use validator::validate_extraction;
