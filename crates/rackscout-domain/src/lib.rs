//! Rackscout Domain Layer
//!
//! Core value types shared by the extraction pipeline and its callers.
//! Nothing in here performs I/O.
//!
//! ## Key Concepts
//!
//! - **ComponentCategory**: The closed set of hardware classes a listing title maps to
//! - **Condition**: Canonical item condition, normalized from marketplace phrasing
//! - **AttributeRecord**: Category-specific attributes extracted from a listing
//! - **Product key**: Deterministic grouping string used for price aggregation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod category;
pub mod condition;
pub mod product_key;

// Re-exports for convenience
pub use attributes::{AttributeRecord, RecordParseError};
pub use category::{ComponentCategory, UnknownCategory};
pub use condition::Condition;
pub use product_key::product_key;
