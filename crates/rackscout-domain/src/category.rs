//! Hardware component categories

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hardware category a listing title is classified into
///
/// The category decides which extraction prompt and which validation schema
/// apply. `Other` is a valid classification result but has no extraction
/// schema of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    /// Memory modules (DIMMs)
    Ram,

    /// Hard drives and SSDs
    Drive,

    /// Complete servers and barebones chassis
    Server,

    /// Server processors
    Cpu,

    /// Network interface cards
    Nic,

    /// Anything else
    Other,
}

/// Returned when a string does not name one of the six categories
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown component category: {0:?}")]
pub struct UnknownCategory(pub String);

impl ComponentCategory {
    /// Every category, in classification-table order
    pub const ALL: [ComponentCategory; 6] = [
        ComponentCategory::Ram,
        ComponentCategory::Drive,
        ComponentCategory::Server,
        ComponentCategory::Cpu,
        ComponentCategory::Nic,
        ComponentCategory::Other,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Ram => "ram",
            ComponentCategory::Drive => "drive",
            ComponentCategory::Server => "server",
            ComponentCategory::Cpu => "cpu",
            ComponentCategory::Nic => "nic",
            ComponentCategory::Other => "other",
        }
    }

    /// Parse a category from raw text, ignoring surrounding whitespace and case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ram" => Some(ComponentCategory::Ram),
            "drive" => Some(ComponentCategory::Drive),
            "server" => Some(ComponentCategory::Server),
            "cpu" => Some(ComponentCategory::Cpu),
            "nic" => Some(ComponentCategory::Nic),
            "other" => Some(ComponentCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
