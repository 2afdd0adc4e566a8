//! Per-category schema validation of extracted records
//!
//! Validation runs common rules first, then the category's required fields,
//! then its optional fields. The first violation is returned.

use crate::error::ValidationError;
use rackscout_domain::{AttributeRecord, ComponentCategory, Condition};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// String with at least one non-whitespace character
    NonEmptyString,
    /// One of a fixed set, matched case-insensitively; canonical spelling is stored
    Enum(&'static [&'static str]),
    /// Inclusive numeric range; integer and float JSON numbers both accepted
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    field: &'static str,
    rule: Rule,
    /// `0` means "not stated" and skips the rule
    zero_is_unset: bool,
}

const fn rule(field: &'static str, rule: Rule) -> FieldRule {
    FieldRule {
        field,
        rule,
        zero_is_unset: false,
    }
}

const fn non_empty(field: &'static str) -> FieldRule {
    rule(field, Rule::NonEmptyString)
}

const fn one_of(field: &'static str, allowed: &'static [&'static str]) -> FieldRule {
    rule(field, Rule::Enum(allowed))
}

const fn range(field: &'static str, min: f64, max: f64) -> FieldRule {
    rule(field, Rule::Range { min, max })
}

struct Schema {
    required: &'static [FieldRule],
    optional: &'static [FieldRule],
}

const RAM_GENERATIONS: &[&str] = &["DDR3", "DDR4", "DDR5"];
const DRIVE_INTERFACES: &[&str] = &["SAS", "SATA", "NVMe", "U.2"];
const DRIVE_FORM_FACTORS: &[&str] = &["2.5", "3.5"];
const DRIVE_TYPES: &[&str] = &["SSD", "HDD"];
const SERVER_FORM_FACTORS: &[&str] = &["1U", "2U", "4U", "tower"];
const CPU_MANUFACTURERS: &[&str] = &["Intel", "AMD"];
const CPU_FAMILIES: &[&str] = &["Xeon", "EPYC"];
const NIC_SPEEDS: &[&str] = &["1GbE", "10GbE", "25GbE", "40GbE", "100GbE"];
const NIC_PORT_TYPES: &[&str] = &["SFP+", "SFP28", "QSFP+", "QSFP28", "RJ45", "BaseT"];

const COMMON: Schema = Schema {
    required: &[range("confidence", 0.0, 1.0)],
    optional: &[range("quantity", 1.0, f64::INFINITY)],
};

const RAM: Schema = Schema {
    required: &[
        range("capacity_gb", 1.0, 1024.0),
        one_of("generation", RAM_GENERATIONS),
    ],
    optional: &[FieldRule {
        field: "speed_mhz",
        rule: Rule::Range {
            min: 800.0,
            max: 8400.0,
        },
        zero_is_unset: true,
    }],
};

const DRIVE: Schema = Schema {
    required: &[non_empty("capacity"), one_of("interface", DRIVE_INTERFACES)],
    optional: &[
        one_of("form_factor", DRIVE_FORM_FACTORS),
        one_of("type", DRIVE_TYPES),
    ],
};

const SERVER: Schema = Schema {
    required: &[non_empty("manufacturer"), non_empty("model")],
    optional: &[one_of("form_factor", SERVER_FORM_FACTORS)],
};

const CPU: Schema = Schema {
    required: &[
        one_of("manufacturer", CPU_MANUFACTURERS),
        one_of("family", CPU_FAMILIES),
        non_empty("model"),
    ],
    optional: &[
        range("cores", 1.0, 256.0),
        range("base_clock_ghz", 0.5, 6.0),
        range("tdp_watts", 10.0, 500.0),
    ],
};

const NIC: Schema = Schema {
    required: &[one_of("speed", NIC_SPEEDS), range("port_count", 1.0, 8.0)],
    optional: &[one_of("port_type", NIC_PORT_TYPES)],
};

const OTHER: Schema = Schema {
    required: &[],
    optional: &[],
};

fn schema_for(category: ComponentCategory) -> &'static Schema {
    match category {
        ComponentCategory::Ram => &RAM,
        ComponentCategory::Drive => &DRIVE,
        ComponentCategory::Server => &SERVER,
        ComponentCategory::Cpu => &CPU,
        ComponentCategory::Nic => &NIC,
        ComponentCategory::Other => &OTHER,
    }
}

/// Validate and normalize an extracted record for `category`
///
/// On success the returned record carries a canonical `condition`, a
/// `confidence` in `[0, 1]`, and canonical spellings for every enum field.
/// Running this again on its own output changes nothing.
///
/// # Examples
///
/// ```
/// use rackscout_domain::{AttributeRecord, ComponentCategory};
/// use rackscout_extractor::validate_extraction;
///
/// let record = AttributeRecord::from_json_str(
///     r#"{"capacity_gb": 32, "generation": "ddr4", "condition": "Pre-owned", "confidence": 0.9}"#,
/// ).unwrap();
///
/// let record = validate_extraction(ComponentCategory::Ram, record).unwrap();
/// assert_eq!(record.str("generation"), Some("DDR4"));
/// assert_eq!(record.str("condition"), Some("used_working"));
/// ```
pub fn validate_extraction(
    category: ComponentCategory,
    mut record: AttributeRecord,
) -> Result<AttributeRecord, ValidationError> {
    normalize_condition(&mut record)?;
    apply_schema(&mut record, &COMMON)?;
    apply_schema(&mut record, schema_for(category))?;
    Ok(record)
}

fn normalize_condition(record: &mut AttributeRecord) -> Result<(), ValidationError> {
    const FIELD: &str = "condition";

    let condition = match record.get(FIELD) {
        None => return Err(ValidationError::MissingField { field: FIELD }),
        Some(Value::String(raw)) => Condition::normalize(raw),
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: FIELD,
                expected: "string",
            })
        }
    };
    record.insert(FIELD, condition.as_str());
    Ok(())
}

fn apply_schema(record: &mut AttributeRecord, schema: &Schema) -> Result<(), ValidationError> {
    for field_rule in schema.required {
        check_field(record, field_rule, true)?;
    }
    for field_rule in schema.optional {
        check_field(record, field_rule, false)?;
    }
    Ok(())
}

fn check_field(
    record: &mut AttributeRecord,
    field_rule: &FieldRule,
    required: bool,
) -> Result<(), ValidationError> {
    let field = field_rule.field;
    let absent = || {
        if required {
            Err(ValidationError::MissingField { field })
        } else {
            Ok(())
        }
    };

    let Some(value) = record.get(field) else {
        return absent();
    };

    match field_rule.rule {
        Rule::NonEmptyString => {
            let text = value.as_str().ok_or(ValidationError::InvalidType {
                field,
                expected: "string",
            })?;
            if text.trim().is_empty() {
                return absent();
            }
        }

        Rule::Enum(allowed) => {
            let text = enum_text(value).ok_or(ValidationError::InvalidType {
                field,
                expected: "string",
            })?;
            let text = text.trim();
            if text.is_empty() {
                return absent();
            }
            let canonical = allowed
                .iter()
                .copied()
                .find(|candidate| candidate.eq_ignore_ascii_case(text))
                .ok_or_else(|| ValidationError::InvalidEnum {
                    field,
                    value: text.to_string(),
                    allowed: allowed.join(", "),
                })?;
            record.insert(field, canonical);
        }

        Rule::Range { min, max } => {
            let number = value.as_f64().ok_or(ValidationError::InvalidType {
                field,
                expected: "number",
            })?;
            if field_rule.zero_is_unset && number == 0.0 {
                return Ok(());
            }
            if !(min..=max).contains(&number) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value: number,
                    min,
                    max,
                });
            }
        }
    }
    Ok(())
}

/// Text of an enum-valued field; numbers such as a bare `2.5` form factor are accepted
fn enum_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
