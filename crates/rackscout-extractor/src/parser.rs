//! Parse LLM output into attribute records

use crate::error::ExtractorError;
use rackscout_domain::AttributeRecord;
use tracing::debug;

/// Parse an extraction response into an unvalidated attribute record
///
/// The response must be a single JSON object, optionally wrapped in a
/// markdown code fence.
pub fn parse_extraction_response(response: &str) -> Result<AttributeRecord, ExtractorError> {
    let json_str = extract_json(response)?;

    let record = AttributeRecord::from_json_str(json_str)
        .map_err(|e| ExtractorError::Parse(e.to_string()))?;

    debug!("Parsed extraction response with {} fields", record.len());
    Ok(record)
}

/// Strip a surrounding markdown code block, if any
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if !trimmed.starts_with("```") {
        return Ok(trimmed);
    }

    // Drop the opening fence line (```json or ```), or just the fence and
    // its language tag when the whole block sits on one line
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed[3..].trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    let body = body.trim();

    if body.is_empty() {
        return Err(ExtractorError::Parse("Empty code block".to_string()));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let record = parse_extraction_response(
            r#"{"capacity_gb": 32, "generation": "DDR4", "condition": "used", "confidence": 0.9}"#,
        )
        .unwrap();
        assert_eq!(record.number("capacity_gb"), Some(32.0));
        assert_eq!(record.str("generation"), Some("DDR4"));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"speed\": \"10GbE\", \"port_count\": 2}\n```";
        let record = parse_extraction_response(response).unwrap();
        assert_eq!(record.str("speed"), Some("10GbE"));
    }

    #[test]
    fn test_parse_plain_fence_and_surrounding_whitespace() {
        let response = "\n  ```\n{\"model\": \"R740\"}\n```  \n";
        let record = parse_extraction_response(response).unwrap();
        assert_eq!(record.str("model"), Some("R740"));
    }

    #[test]
    fn test_integral_floats_become_integers() {
        let record = parse_extraction_response(r#"{"capacity_gb": 32.0}"#).unwrap();
        assert!(record.get("capacity_gb").unwrap().is_i64());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_extraction_response("This is not JSON").unwrap_err();
        assert!(matches!(err, ExtractorError::Parse(_)));
    }

    #[test]
    fn test_parse_non_object() {
        let err = parse_extraction_response("[1, 2, 3]").unwrap_err();
        match err {
            ExtractorError::Parse(msg) => assert!(msg.contains("object")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_single_line_fenced_block() {
        let record = parse_extraction_response("```json {\"a\":1}```").unwrap();
        assert_eq!(record.number("a"), Some(1.0));

        let record = parse_extraction_response("```{\"speed\": \"10GbE\"}```").unwrap();
        assert_eq!(record.str("speed"), Some("10GbE"));
    }

    #[test]
    fn test_empty_code_block() {
        assert!(matches!(
            parse_extraction_response("```json\n```"),
            Err(ExtractorError::Parse(_))
        ));
        assert!(matches!(
            parse_extraction_response("```"),
            Err(ExtractorError::Parse(_))
        ));
        assert!(matches!(
            parse_extraction_response("```json```"),
            Err(ExtractorError::Parse(_))
        ));
    }
}
