//! Prompt templates and rendering for classification and extraction

use crate::error::ExtractorError;
use rackscout_domain::ComponentCategory;
use std::collections::{BTreeMap, HashMap};

/// Structured item specifics supplied by the marketplace (name -> value)
pub type ItemSpecifics = BTreeMap<String, String>;

/// Placeholder used when a listing has no specifics or description
pub const NOT_AVAILABLE: &str = "N/A";

/// System message sent with extraction calls unless configured otherwise
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured attributes from \
second-hand server hardware listings. Respond with a single JSON object and nothing else.";

/// One prompt template per extractable category plus the classifier template
///
/// Built once and never mutated; shared by every call an `Extractor` makes.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    classify: &'static str,
    extract: HashMap<ComponentCategory, &'static str>,
}

impl TemplateRegistry {
    /// Registry with the built-in templates
    ///
    /// `ComponentCategory::Other` deliberately has no extraction template.
    pub fn new() -> Self {
        let extract = HashMap::from([
            (ComponentCategory::Ram, RAM_TEMPLATE),
            (ComponentCategory::Drive, DRIVE_TEMPLATE),
            (ComponentCategory::Server, SERVER_TEMPLATE),
            (ComponentCategory::Cpu, CPU_TEMPLATE),
            (ComponentCategory::Nic, NIC_TEMPLATE),
        ]);
        Self {
            classify: CLASSIFY_TEMPLATE,
            extract,
        }
    }

    /// Whether an extraction template exists for `category`
    pub fn has_template(&self, category: ComponentCategory) -> bool {
        self.extract.contains_key(&category)
    }

    /// Render the classification prompt; never fails
    pub fn render_classify_prompt(&self, title: &str) -> String {
        fill(self.classify, &[("title", title)])
    }

    /// Render the extraction prompt for `category`
    ///
    /// Fails with `UnsupportedCategory` when no template is registered.
    pub fn render_extract_prompt(
        &self,
        category: ComponentCategory,
        title: &str,
        specifics: &ItemSpecifics,
    ) -> Result<String, ExtractorError> {
        self.render(category, title, specifics, None)
    }

    /// Render the server extraction prompt including the listing description
    pub fn render_server_extract_prompt(
        &self,
        title: &str,
        specifics: &ItemSpecifics,
        description: &str,
    ) -> Result<String, ExtractorError> {
        self.render(ComponentCategory::Server, title, specifics, Some(description))
    }

    fn render(
        &self,
        category: ComponentCategory,
        title: &str,
        specifics: &ItemSpecifics,
        description: Option<&str>,
    ) -> Result<String, ExtractorError> {
        let template = self
            .extract
            .get(&category)
            .ok_or(ExtractorError::UnsupportedCategory(category))?;

        let specifics = format_specifics(specifics);
        let description = match description.map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => NOT_AVAILABLE,
        };

        Ok(fill(
            template,
            &[
                ("title", title),
                ("specifics", &specifics),
                ("description", description),
            ],
        ))
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten specifics to `"key: value, key: value"`, or `N/A` when empty
pub fn format_specifics(specifics: &ItemSpecifics) -> String {
    if specifics.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    specifics
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Substitute `{{name}}` placeholders in one pass
///
/// Substituted values are never rescanned, so a title containing
/// `{{specifics}}` stays literal. Unknown placeholders are kept as-is.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

const CLASSIFY_TEMPLATE: &str = r#"Classify this marketplace listing title into exactly one hardware category.

Categories:
- ram: memory modules (DIMM, RDIMM, LRDIMM, SODIMM, DDR3/DDR4/DDR5)
- drive: hard drives and solid state drives (HDD, SSD, NVMe, SAS, SATA, U.2)
- server: complete servers, barebones chassis, nodes (PowerEdge, ProLiant, Supermicro)
- cpu: processors (Xeon, EPYC)
- nic: network interface cards (10GbE, 25GbE, SFP+, QSFP, ConnectX, X520)
- other: anything else (cables, rails, GPUs, power supplies, lots of mixed parts)

Title: {{title}}

Answer with the category word only: ram, drive, server, cpu, nic, or other."#;

const RAM_TEMPLATE: &str = r#"Extract memory module attributes from this listing.

Title: {{title}}
Item specifics: {{specifics}}

Return a JSON object with these fields:
{
  "manufacturer": "Samsung, SK Hynix, Micron, Kingston, ... or null",
  "capacity_gb": capacity of ONE module in GB (number, 1-1024),
  "quantity": number of modules in the listing (number >= 1, default 1),
  "generation": "DDR3" | "DDR4" | "DDR5",
  "speed_mhz": data rate in MT/s (number, 800-8400) or null if not stated,
  "ecc": true | false | null,
  "registered": true | false | null (true for RDIMM/LRDIMM),
  "form_factor": "DIMM" | "SODIMM" | "LRDIMM" | null,
  "rank": "1Rx4", "2Rx8", ... or null,
  "part_number": manufacturer part number or null,
  "condition": "new" | "like_new" | "used_working" | "for_parts" | "unknown",
  "confidence": your confidence in this extraction (0.0-1.0)
}

Rules:
- A PC module code such as PC4-21300 or PC4-2666V encodes the speed; DDR4-2666 means 2666
- "4x16GB" means capacity_gb 16 and quantity 4
- Use null for anything the listing does not state

Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const DRIVE_TEMPLATE: &str = r#"Extract storage drive attributes from this listing.

Title: {{title}}
Item specifics: {{specifics}}

Return a JSON object with these fields:
{
  "manufacturer": "Seagate, WD, HGST, Samsung, Intel, Micron, ... or null",
  "model": model or part number or null,
  "capacity": capacity as written with unit, e.g. "4TB", "960GB", "1.92TB",
  "interface": "SAS" | "SATA" | "NVMe" | "U.2",
  "form_factor": "2.5" | "3.5" | null,
  "type": "SSD" | "HDD" | null,
  "rpm": spindle speed for HDDs (5400, 7200, 10000, 15000) or null,
  "quantity": number of drives in the listing (number >= 1, default 1),
  "condition": "new" | "like_new" | "used_working" | "for_parts" | "unknown",
  "confidence": your confidence in this extraction (0.0-1.0)
}

Rules:
- Form factor values are strings without the inch mark
- Use null for anything the listing does not state

Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const SERVER_TEMPLATE: &str = r#"Extract server attributes from this listing.

Title: {{title}}
Item specifics: {{specifics}}
Description: {{description}}

Return a JSON object with these fields:
{
  "manufacturer": "Dell", "HPE", "Supermicro", "Lenovo", ...,
  "model": model name, e.g. "PowerEdge R740", "ProLiant DL380 Gen10",
  "form_factor": "1U" | "2U" | "4U" | "tower" | null,
  "cpu_model": installed processor model or null,
  "cpu_count": number of installed processors or null,
  "ram_gb": total installed memory in GB or null,
  "drive_bays": number of drive bays or null,
  "drive_form_factor": "2.5" | "3.5" | null (size of the drive bays),
  "quantity": number of servers in the listing (number >= 1, default 1),
  "condition": "new" | "like_new" | "used_working" | "for_parts" | "unknown",
  "confidence": your confidence in this extraction (0.0-1.0)
}

Rules:
- "barebones" or "no CPU/RAM" means cpu_count 0 and ram_gb 0
- SFF bays are "2.5", LFF bays are "3.5"
- Use null for anything the listing does not state

Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const CPU_TEMPLATE: &str = r#"Extract processor attributes from this listing.

Title: {{title}}
Item specifics: {{specifics}}

Return a JSON object with these fields:
{
  "manufacturer": "Intel" | "AMD",
  "family": "Xeon" | "EPYC",
  "model": model within the family, e.g. "Gold 6130", "E5-2680 v4", "7302",
  "cores": core count (number, 1-256) or null,
  "base_clock_ghz": base clock in GHz (number, 0.5-6.0) or null,
  "tdp_watts": TDP in watts (number, 10-500) or null,
  "socket": "LGA2011-3", "LGA3647", "SP3", ... or null,
  "quantity": number of processors in the listing (number >= 1, default 1),
  "condition": "new" | "like_new" | "used_working" | "for_parts" | "unknown",
  "confidence": your confidence in this extraction (0.0-1.0)
}

Rules:
- "Matched pair" or "x2" means quantity 2
- Use null for anything the listing does not state

Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const NIC_TEMPLATE: &str = r#"Extract network card attributes from this listing.

Title: {{title}}
Item specifics: {{specifics}}

Return a JSON object with these fields:
{
  "manufacturer": "Intel", "Mellanox", "Broadcom", "Chelsio", ... or null,
  "model": model, e.g. "X520-DA2", "ConnectX-4 Lx", or null,
  "speed": "1GbE" | "10GbE" | "25GbE" | "40GbE" | "100GbE",
  "port_count": number of ports (number, 1-8),
  "port_type": "SFP+" | "SFP28" | "QSFP+" | "QSFP28" | "RJ45" | "BaseT" | null,
  "bracket": "full" | "low" | null (bracket height),
  "quantity": number of cards in the listing (number >= 1, default 1),
  "condition": "new" | "like_new" | "used_working" | "for_parts" | "unknown",
  "confidence": your confidence in this extraction (0.0-1.0)
}

Rules:
- "Dual port" means port_count 2, "quad port" means 4
- Use null for anything the listing does not state

Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn specifics(pairs: &[(&str, &str)]) -> ItemSpecifics {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classify_prompt_includes_title() {
        let registry = TemplateRegistry::new();
        let prompt = registry.render_classify_prompt("Samsung 32GB 2Rx4 PC4-2666V RDIMM");
        assert!(prompt.contains("Title: Samsung 32GB 2Rx4 PC4-2666V RDIMM"));
        assert!(prompt.contains("ram, drive, server, cpu, nic, or other"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_every_extractable_category_renders() {
        let registry = TemplateRegistry::new();
        for category in ComponentCategory::ALL {
            let result = registry.render_extract_prompt(category, "title", &ItemSpecifics::new());
            if category == ComponentCategory::Other {
                assert!(matches!(
                    result,
                    Err(ExtractorError::UnsupportedCategory(ComponentCategory::Other))
                ));
                assert!(!registry.has_template(category));
            } else {
                let prompt = result.unwrap();
                assert!(prompt.contains("Title: title"), "{}", category);
                assert!(prompt.contains("\"condition\""), "{}", category);
                assert!(prompt.contains("\"confidence\""), "{}", category);
                assert!(!prompt.contains("{{"), "{}", category);
            }
        }
    }

    #[test]
    fn test_templates_name_required_fields() {
        let registry = TemplateRegistry::new();
        let empty = ItemSpecifics::new();
        let ram = registry.render_extract_prompt(ComponentCategory::Ram, "t", &empty).unwrap();
        assert!(ram.contains("\"capacity_gb\"") && ram.contains("\"generation\""));
        let nic = registry.render_extract_prompt(ComponentCategory::Nic, "t", &empty).unwrap();
        assert!(nic.contains("\"speed\"") && nic.contains("\"port_count\""));
        let server = registry.render_extract_prompt(ComponentCategory::Server, "t", &empty).unwrap();
        assert!(server.contains("\"drive_form_factor\""));
    }

    #[test]
    fn test_specifics_formatting() {
        assert_eq!(format_specifics(&ItemSpecifics::new()), "N/A");
        let s = specifics(&[("Speed", "2666 MHz"), ("Capacity", "32 GB")]);
        // Sorted by key for deterministic prompts
        assert_eq!(format_specifics(&s), "Capacity: 32 GB, Speed: 2666 MHz");
    }

    #[test]
    fn test_extract_prompt_includes_specifics() {
        let registry = TemplateRegistry::new();
        let prompt = registry
            .render_extract_prompt(
                ComponentCategory::Drive,
                "HGST 4TB SAS",
                &specifics(&[("Interface", "SAS 12Gb/s")]),
            )
            .unwrap();
        assert!(prompt.contains("Item specifics: Interface: SAS 12Gb/s"));
    }

    #[test]
    fn test_server_prompt_description() {
        let registry = TemplateRegistry::new();
        let empty = ItemSpecifics::new();

        let with = registry
            .render_server_extract_prompt("Dell R740", &empty, "8x SFF bays, 2x Gold 6130")
            .unwrap();
        assert!(with.contains("Description: 8x SFF bays, 2x Gold 6130"));

        let without = registry
            .render_extract_prompt(ComponentCategory::Server, "Dell R740", &empty)
            .unwrap();
        assert!(without.contains("Description: N/A"));

        let blank = registry.render_server_extract_prompt("Dell R740", &empty, "  ").unwrap();
        assert!(blank.contains("Description: N/A"));
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill("A {{title}} B {{specifics}}", &[("title", "{{specifics}}"), ("specifics", "x")]);
        assert_eq!(out, "A {{specifics}} B x");
    }

    #[test]
    fn test_fill_keeps_unknown_and_unterminated_placeholders() {
        assert_eq!(fill("{{nope}} {{title}}", &[("title", "t")]), "{{nope}} t");
        assert_eq!(fill("tail {{title", &[("title", "t")]), "tail {{title");
    }
}
