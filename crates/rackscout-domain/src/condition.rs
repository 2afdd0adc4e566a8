//! Item condition and marketplace phrase normalization

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical condition of a listed item
///
/// Providers describe condition in free text ("Pre-owned", "For parts or not
/// working", ...). Every stored record carries one of these five values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Factory new, sealed or unused
    New,

    /// Open box or manufacturer refurbished
    LikeNew,

    /// Used and reported working
    UsedWorking,

    /// Broken, untested or sold as-is
    ForParts,

    /// Could not be determined
    Unknown,
}

/// Known marketplace phrases, lower-cased, mapped to their canonical condition
const CONDITION_SYNONYMS: &[(&str, Condition)] = &[
    ("new", Condition::New),
    ("brand new", Condition::New),
    ("new in box", Condition::New),
    ("nib", Condition::New),
    ("sealed", Condition::New),
    ("factory sealed", Condition::New),
    ("like_new", Condition::LikeNew),
    ("like new", Condition::LikeNew),
    ("open box", Condition::LikeNew),
    ("new other (see details)", Condition::LikeNew),
    ("manufacturer refurbished", Condition::LikeNew),
    ("certified refurbished", Condition::LikeNew),
    ("used_working", Condition::UsedWorking),
    ("used", Condition::UsedWorking),
    ("pre-owned", Condition::UsedWorking),
    ("seller refurbished", Condition::UsedWorking),
    ("refurbished", Condition::UsedWorking),
    ("tested working", Condition::UsedWorking),
    ("working", Condition::UsedWorking),
    ("for_parts", Condition::ForParts),
    ("for parts", Condition::ForParts),
    ("for parts or not working", Condition::ForParts),
    ("parts only", Condition::ForParts),
    ("not working", Condition::ForParts),
    ("as-is", Condition::ForParts),
    ("unknown", Condition::Unknown),
];

impl Condition {
    /// Get the canonical condition string
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like_new",
            Condition::UsedWorking => "used_working",
            Condition::ForParts => "for_parts",
            Condition::Unknown => "unknown",
        }
    }

    /// Normalize free-text condition phrasing
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything not in the synonym table, including the empty string, maps to
    /// [`Condition::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rackscout_domain::Condition;
    ///
    /// assert_eq!(Condition::normalize("  Pre-Owned "), Condition::UsedWorking);
    /// assert_eq!(Condition::normalize("mint-ish"), Condition::Unknown);
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let key = raw.trim().to_lowercase();
        CONDITION_SYNONYMS
            .iter()
            .find(|(phrase, _)| *phrase == key)
            .map(|(_, condition)| *condition)
            .unwrap_or(Condition::Unknown)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_synonym_normalizes_to_its_table_value() {
        for (phrase, expected) in CONDITION_SYNONYMS {
            assert_eq!(Condition::normalize(phrase), *expected, "phrase {:?}", phrase);
            assert_eq!(
                Condition::normalize(&format!("  {}\t", phrase.to_uppercase())),
                *expected,
                "padded upper-case phrase {:?}",
                phrase
            );
        }
    }

    #[test]
    fn test_canonical_values_are_fixed_points() {
        for condition in [
            Condition::New,
            Condition::LikeNew,
            Condition::UsedWorking,
            Condition::ForParts,
            Condition::Unknown,
        ] {
            assert_eq!(Condition::normalize(condition.as_str()), condition);
        }
    }

    #[test]
    fn test_unrecognized_is_unknown() {
        assert_eq!(Condition::normalize(""), Condition::Unknown);
        assert_eq!(Condition::normalize("   "), Condition::Unknown);
        assert_eq!(Condition::normalize("gently loved"), Condition::Unknown);
    }

    #[test]
    fn test_common_marketplace_phrases() {
        assert_eq!(Condition::normalize("For parts or not working"), Condition::ForParts);
        assert_eq!(Condition::normalize("Open Box"), Condition::LikeNew);
        assert_eq!(Condition::normalize("Brand New"), Condition::New);
    }
}
