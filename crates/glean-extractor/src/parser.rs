//! Parse LLM output into validated records

use crate::error::ExtractError;
use glean_domain::{ExtractionFailure, Filter};
use serde_json::{Map, Value};
use tracing::warn;

/// Outcome of parsing one model response
pub(crate) struct ParsedResponse {
    /// Entities that validated against the filter
    pub entities: Vec<Map<String, Value>>,
    /// Entities that were rejected, with reasons
    pub failures: Vec<ExtractionFailure>,
    /// Total entities the model proposed
    pub attempted: usize,
}

/// Parse an LLM response against a filter
///
/// Malformed individual entities are skipped and reported; a response that
/// is not JSON or lacks the `entities` array is a hard error.
pub(crate) fn parse_response(
    response: &str,
    filter: &Filter,
) -> Result<ParsedResponse, ExtractError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let entities_json = json
        .get("entities")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            ExtractError::InvalidFormat("Expected object with 'entities' array".to_string())
        })?;

    let mut entities = Vec::new();
    let mut failures = Vec::new();

    for (idx, entity_json) in entities_json.iter().enumerate() {
        match validate_entity(entity_json, filter) {
            Ok(entity) => entities.push(entity),
            Err(reason) => {
                warn!("Entity {} rejected: {}", idx, reason);
                failures.push(ExtractionFailure {
                    reason,
                    raw_text: entity_json.to_string(),
                });
            }
        }
    }

    Ok(ParsedResponse {
        entities,
        failures,
        attempted: entities_json.len(),
    })
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip first line (```json or ```) and last line (```)
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate a single entity against the filter
fn validate_entity(json: &Value, filter: &Filter) -> Result<Map<String, Value>, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "entity is not a JSON object".to_string())?;

    let mut entity = Map::new();

    for field in filter.fields() {
        match obj.get(&field.name) {
            Some(Value::Null) | None => {
                if !field.optional {
                    return Err(format!("missing required field '{}'", field.name));
                }
                // Keep explicit nulls for optional fields so exports stay rectangular
                entity.insert(field.name.clone(), Value::Null);
            }
            Some(value) => {
                if !field.field_type.matches(value) {
                    return Err(format!(
                        "field '{}' has wrong type (expected {})",
                        field.name, field.field_type
                    ));
                }
                entity.insert(field.name.clone(), value.clone());
            }
        }
    }

    for key in obj.keys() {
        if !entity.contains_key(key) {
            warn!("Dropping unknown field '{}' from entity", key);
        }
    }

    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_domain::{FieldSpec, FieldType, Scalar};

    fn sample_filter() -> Filter {
        Filter::new(vec![
            FieldSpec::required("name", FieldType::Scalar(Scalar::Str)),
            FieldSpec::required("age", FieldType::Scalar(Scalar::Int)),
            FieldSpec::optional("tags", FieldType::List(Scalar::Str)),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_valid_response() {
        let response = r#"{"entities": [
            {"name": "Alice", "age": 30, "tags": ["engineer"]},
            {"name": "Bob", "age": 41}
        ]}"#;

        let parsed = parse_response(response, &sample_filter()).unwrap();
        assert_eq!(parsed.entities.len(), 2);
        assert_eq!(parsed.attempted, 2);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.entities[0]["name"], "Alice");
        // Optional field absent in source becomes explicit null
        assert_eq!(parsed.entities[1]["tags"], Value::Null);
    }

    #[test]
    fn test_parse_markdown_wrapped_response() {
        let response = "```json\n{\"entities\": [{\"name\": \"Alice\", \"age\": 30}]}\n```";
        let parsed = parse_response(response, &sample_filter()).unwrap();
        assert_eq!(parsed.entities.len(), 1);
    }

    #[test]
    fn test_parse_markdown_without_language_tag() {
        let response = "```\n{\"entities\": []}\n```";
        let parsed = parse_response(response, &sample_filter()).unwrap();
        assert!(parsed.entities.is_empty());
    }

    #[test]
    fn test_parse_not_json() {
        let result = parse_response("this is not JSON", &sample_filter());
        assert!(matches!(result, Err(ExtractError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_missing_entities_key() {
        let result = parse_response(r#"{"items": []}"#, &sample_filter());
        assert!(matches!(result, Err(ExtractError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_required_field_is_failure() {
        let response = r#"{"entities": [{"name": "Alice"}]}"#;
        let parsed = parse_response(response, &sample_filter()).unwrap();

        assert!(parsed.entities.is_empty());
        assert_eq!(parsed.failures.len(), 1);
        assert!(parsed.failures[0].reason.contains("age"));
        assert_eq!(parsed.attempted, 1);
    }

    #[test]
    fn test_wrong_type_is_failure() {
        let response = r#"{"entities": [{"name": "Alice", "age": "thirty"}]}"#;
        let parsed = parse_response(response, &sample_filter()).unwrap();

        assert!(parsed.entities.is_empty());
        assert!(parsed.failures[0].reason.contains("wrong type"));
    }

    #[test]
    fn test_integral_float_accepted_for_int() {
        let response = r#"{"entities": [{"name": "Alice", "age": 30.0}]}"#;
        let parsed = parse_response(response, &sample_filter()).unwrap();
        assert_eq!(parsed.entities.len(), 1);
    }

    #[test]
    fn test_partial_success() {
        let response = r#"{"entities": [
            {"name": "Alice", "age": 30},
            {"name": "Bob"},
            {"name": "Carol", "age": 28}
        ]}"#;

        let parsed = parse_response(response, &sample_filter()).unwrap();
        assert_eq!(parsed.entities.len(), 2);
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.attempted, 3);
        assert_eq!(parsed.entities[1]["name"], "Carol");
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let response = r#"{"entities": [{"name": "Alice", "age": 30, "extra": "x"}]}"#;
        let parsed = parse_response(response, &sample_filter()).unwrap();

        assert_eq!(parsed.entities.len(), 1);
        assert!(!parsed.entities[0].contains_key("extra"));
    }

    #[test]
    fn test_null_required_field_is_failure() {
        let response = r#"{"entities": [{"name": null, "age": 30}]}"#;
        let parsed = parse_response(response, &sample_filter()).unwrap();
        assert!(parsed.entities.is_empty());
    }

    #[test]
    fn test_extract_json_plain() {
        let json = r#"{"entities": []}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }
}
