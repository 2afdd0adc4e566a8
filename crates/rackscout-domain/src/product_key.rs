//! Product keys for cross-listing price aggregation
//!
//! A product key is a colon-delimited string built from the attributes that
//! identify "the same product" within a category. Keys are only ever compared
//! for equality; they are never parsed back into attributes.
//!
//! | category | format |
//! |---|---|
//! | ram | `ram:<generation>:<subtype>:<capacity_gb>gb:<speed_mhz>` |
//! | drive | `drive:<interface>:<form_factor>:<capacity>:<subtype>` |
//! | server | `server:<manufacturer>:<model>:<drive_form_factor>` |
//! | cpu | `cpu:<manufacturer>:<family>:<model>` |
//! | nic | `nic:<speed>:<port_count>p:<port_type>` |
//! | anything else | `other:<category>` |

use crate::AttributeRecord;

const UNKNOWN: &str = "unknown";

/// Build the grouping key for a validated record
///
/// Total over every input: missing, empty or wrong-typed string fields become
/// `unknown` and missing numeric fields become `0`.
///
/// # Examples
///
/// ```
/// use rackscout_domain::{product_key, AttributeRecord};
/// use serde_json::json;
///
/// let attrs = AttributeRecord::from_value(json!({
///     "generation": "DDR4", "ecc": true, "registered": true,
///     "capacity_gb": 32, "speed_mhz": 2666
/// })).unwrap();
/// assert_eq!(product_key("ram", &attrs), "ram:ddr4:ecc_reg:32gb:2666");
/// assert_eq!(product_key("gpu", &AttributeRecord::new()), "other:gpu");
/// ```
pub fn product_key(category: &str, attrs: &AttributeRecord) -> String {
    match category {
        "ram" => format!(
            "ram:{}:{}:{}gb:{}",
            token(attrs, "generation"),
            ram_subtype(attrs),
            number(attrs, "capacity_gb"),
            number(attrs, "speed_mhz"),
        ),
        "drive" => format!(
            "drive:{}:{}:{}:{}",
            token(attrs, "interface"),
            token(attrs, "form_factor"),
            token(attrs, "capacity"),
            drive_subtype(attrs),
        ),
        "server" => format!(
            "server:{}:{}:{}",
            token(attrs, "manufacturer"),
            token(attrs, "model"),
            token(attrs, "drive_form_factor"),
        ),
        "cpu" => format!(
            "cpu:{}:{}:{}",
            token(attrs, "manufacturer"),
            token(attrs, "family"),
            token(attrs, "model"),
        ),
        "nic" => format!(
            "nic:{}:{}p:{}",
            token(attrs, "speed"),
            number(attrs, "port_count"),
            token(attrs, "port_type"),
        ),
        other => format!("other:{}", other),
    }
}

/// Lower-cased string field with spaces replaced by underscores
fn token(attrs: &AttributeRecord, field: &str) -> String {
    match attrs.str(field) {
        Some(s) if !s.is_empty() => s.to_lowercase().replace(' ', "_"),
        _ => UNKNOWN.to_string(),
    }
}

/// Numeric field rendered without a trailing `.0`; missing becomes `0`
fn number(attrs: &AttributeRecord, field: &str) -> String {
    match attrs.number(field) {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => format!("{}", n as i64),
        Some(n) => format!("{}", n),
        None => "0".to_string(),
    }
}

fn ram_subtype(attrs: &AttributeRecord) -> &'static str {
    match (attrs.bool("ecc"), attrs.bool("registered")) {
        (Some(true), Some(true)) => "ecc_reg",
        (Some(true), _) => "ecc_unbuf",
        (Some(false), _) => "non_ecc",
        (None, _) => UNKNOWN,
    }
}

fn drive_subtype(attrs: &AttributeRecord) -> &'static str {
    let Some(kind) = attrs.str("type") else {
        return UNKNOWN;
    };
    if kind.eq_ignore_ascii_case("SSD") {
        return "ssd";
    }
    match attrs.number("rpm").map(|rpm| rpm as i64) {
        Some(7200) => "7k2",
        Some(10000) => "10k",
        Some(15000) => "15k",
        _ => "hdd",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> AttributeRecord {
        AttributeRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_ram_key() {
        let attrs = record(json!({
            "generation": "DDR4", "ecc": true, "registered": true,
            "capacity_gb": 32, "speed_mhz": 2666
        }));
        assert_eq!(product_key("ram", &attrs), "ram:ddr4:ecc_reg:32gb:2666");
    }

    #[test]
    fn test_ram_subtypes() {
        let unbuffered = record(json!({"generation": "DDR5", "ecc": true, "capacity_gb": 16}));
        assert_eq!(product_key("ram", &unbuffered), "ram:ddr5:ecc_unbuf:16gb:0");

        let unbuffered_explicit = record(json!({"ecc": true, "registered": false}));
        assert!(product_key("ram", &unbuffered_explicit).contains(":ecc_unbuf:"));

        let desktop = record(json!({"generation": "DDR3", "ecc": false, "registered": true}));
        assert!(product_key("ram", &desktop).contains(":non_ecc:"));

        let unstated = record(json!({"generation": "DDR3", "ecc": "yes"}));
        assert!(product_key("ram", &unstated).contains(":unknown:"));
    }

    #[test]
    fn test_ram_key_float_speed() {
        let attrs = record(json!({"generation": "DDR4", "ecc": true, "registered": true,
                                  "capacity_gb": 64.0, "speed_mhz": 3200.0}));
        assert_eq!(product_key("ram", &attrs), "ram:ddr4:ecc_reg:64gb:3200");
    }

    #[test]
    fn test_drive_key() {
        let attrs = record(json!({
            "interface": "SATA", "form_factor": "3.5", "capacity": "4TB",
            "type": "HDD", "rpm": 7200
        }));
        assert_eq!(product_key("drive", &attrs), "drive:sata:3.5:4tb:7k2");
    }

    #[test]
    fn test_drive_subtypes() {
        let ssd = record(json!({"interface": "NVMe", "form_factor": "2.5",
                                "capacity": "1.92TB", "type": "SSD", "rpm": 7200}));
        assert_eq!(product_key("drive", &ssd), "drive:nvme:2.5:1.92tb:ssd");

        let sas_10k = record(json!({"type": "HDD", "rpm": 10000}));
        assert!(product_key("drive", &sas_10k).ends_with(":10k"));

        let sas_15k = record(json!({"type": "HDD", "rpm": 15000.0}));
        assert!(product_key("drive", &sas_15k).ends_with(":15k"));

        let odd_rpm = record(json!({"type": "HDD", "rpm": 5400}));
        assert!(product_key("drive", &odd_rpm).ends_with(":hdd"));

        let no_rpm = record(json!({"type": "HDD"}));
        assert!(product_key("drive", &no_rpm).ends_with(":hdd"));

        let no_type = record(json!({"rpm": 7200}));
        assert_eq!(product_key("drive", &no_type), "drive:unknown:unknown:unknown:unknown");
    }

    #[test]
    fn test_server_key() {
        let attrs = record(json!({
            "manufacturer": "Dell", "model": "PowerEdge R740", "drive_form_factor": "2.5"
        }));
        assert_eq!(product_key("server", &attrs), "server:dell:poweredge_r740:2.5");
    }

    #[test]
    fn test_cpu_key() {
        let attrs = record(json!({"manufacturer": "Intel", "family": "Xeon", "model": "Gold 6130"}));
        assert_eq!(product_key("cpu", &attrs), "cpu:intel:xeon:gold_6130");
    }

    #[test]
    fn test_nic_key() {
        let attrs = record(json!({"speed": "25GbE", "port_count": 2, "port_type": "SFP28"}));
        assert_eq!(product_key("nic", &attrs), "nic:25gbe:2p:sfp28");
    }

    #[test]
    fn test_unknown_category() {
        assert_eq!(product_key("gpu", &AttributeRecord::new()), "other:gpu");
        assert_eq!(product_key("other", &AttributeRecord::new()), "other:other");
    }

    #[test]
    fn test_empty_records_use_placeholders() {
        let empty = AttributeRecord::new();
        assert_eq!(product_key("ram", &empty), "ram:unknown:unknown:0gb:0");
        assert_eq!(product_key("server", &empty), "server:unknown:unknown:unknown");
        assert_eq!(product_key("cpu", &empty), "cpu:unknown:unknown:unknown");
        assert_eq!(product_key("nic", &empty), "nic:unknown:0p:unknown");
    }

    #[test]
    fn test_empty_and_wrong_typed_strings() {
        let attrs = record(json!({"manufacturer": "", "family": 7, "model": null}));
        assert_eq!(product_key("cpu", &attrs), "cpu:unknown:unknown:unknown");
    }
}
