//! Parse LLM output into template fields

use crate::error::ExtractorError;
use docfill_domain::Field;
use serde_json::{Map, Value};

/// Parse the model's raw response into (unenriched) fields
///
/// The response may wrap the JSON in a markdown fence and surround it with
/// prose. A block tagged `json` wins over an untagged block, which wins over
/// treating the whole response as JSON.
///
/// # Errors
///
/// Returns [`ExtractorError::MalformedResponse`] when no JSON array is found
/// or any element is not a field-like object. This function never logs; the
/// caller decides what to do with the raw text.
pub fn parse_llm_response(response: &str) -> Result<Vec<Field>, ExtractorError> {
    let candidate = extract_json(response);

    let json: Value = serde_json::from_str(candidate)
        .map_err(|e| ExtractorError::MalformedResponse(format!("JSON parse error: {}", e)))?;

    let items = json
        .as_array()
        .ok_or_else(|| ExtractorError::MalformedResponse("Expected JSON array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            parse_field_json(item).map_err(|e| {
                ExtractorError::MalformedResponse(format!("Field {}: {}", idx, e))
            })
        })
        .collect()
}

/// Locate the JSON candidate inside a response
fn extract_json(response: &str) -> &str {
    fenced_block(response, "```json")
        .or_else(|| fenced_block(response, "```"))
        .unwrap_or_else(|| response.trim())
}

/// Body of the first fenced block opened by `opener`, if it is closed
fn fenced_block<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let after_open = text.find(opener)? + opener.len();
    let rest = &text[after_open..];

    // Skip the remainder of the opening line when it is only a language tag
    let body = match rest.find('\n') {
        Some(nl) if rest[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[nl + 1..]
        }
        _ => rest,
    };

    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Parse a single field from JSON
fn parse_field_json(json: &Value) -> Result<Field, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Field is not a JSON object".to_string())?;

    let field_name = required_str(obj, "fieldName")?;
    let current_value = required_scalar(obj, "currentValue")?;
    let field_type = required_str(obj, "fieldType")?;

    let position = match obj.get("position") {
        None | Some(Value::Null) => String::new(),
        Some(v) => scalar_to_string(v).ok_or_else(|| "Invalid 'position'".to_string())?,
    };

    let format = match obj.get("format") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err("Invalid 'format'".to_string()),
    };

    Ok(Field {
        field_name,
        current_value,
        field_type,
        position,
        validation_rules: string_list(obj, "validationRules")?,
        dependencies: string_list(obj, "dependencies")?,
        format,
        ..Default::default()
    })
}

fn required_str(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Missing or invalid '{}'", key))
}

fn required_scalar(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    obj.get(key)
        .and_then(scalar_to_string)
        .ok_or_else(|| format!("Missing or invalid '{}'", key))
}

/// Models sometimes emit numbers where strings were asked for
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("'{}' must contain only strings", key))
            })
            .collect(),
        Some(_) => Err(format!("'{}' must be an array", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_domain::FailureKind;

    const ONE_FIELD: &str = r#"[
        {
            "fieldName": "Customer Name",
            "currentValue": "John Smith",
            "fieldType": "name",
            "position": "opening salutation",
            "validationRules": ["must not be empty"],
            "dependencies": [],
            "format": "First Last"
        }
    ]"#;

    #[test]
    fn test_parse_valid_json() {
        let fields = parse_llm_response(ONE_FIELD).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_name, "Customer Name");
        assert_eq!(fields[0].current_value, "John Smith");
        assert_eq!(fields[0].field_type, "name");
        assert_eq!(fields[0].validation_rules, vec!["must not be empty"]);
        assert_eq!(fields[0].format, "First Last");
        assert_eq!(fields[0].context_before, "");
    }

    #[test]
    fn test_json_fence_matches_unwrapped() {
        let fenced = format!("```json\n{}\n```", ONE_FIELD);
        assert_eq!(
            parse_llm_response(&fenced).unwrap(),
            parse_llm_response(ONE_FIELD).unwrap()
        );
    }

    #[test]
    fn test_fence_surrounded_by_prose() {
        let response = format!(
            "Here are the fields I found:\n\n```json\n{}\n```\n\nLet me know if you need more.",
            ONE_FIELD
        );
        assert_eq!(parse_llm_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_json_fence_preferred_over_earlier_plain_fence() {
        let response = format!("```\nnot json\n```\n\n```json\n{}\n```", ONE_FIELD);
        assert_eq!(parse_llm_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_untagged_fence() {
        let response = format!("```\n{}\n```", ONE_FIELD);
        assert_eq!(parse_llm_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_llm_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_plain_prose_is_malformed() {
        let result = parse_llm_response("I could not find any template fields in this document.");
        assert!(matches!(result, Err(ExtractorError::MalformedResponse(_))));
    }

    #[test]
    fn test_object_instead_of_array_is_malformed() {
        let result = parse_llm_response(r#"{"fieldName": "Name"}"#);
        assert!(matches!(result, Err(ExtractorError::MalformedResponse(_))));
    }

    #[test]
    fn test_unclosed_fence_is_malformed() {
        let result = parse_llm_response("```json\n[{\"fieldName\": \"x\"");
        assert!(matches!(result, Err(ExtractorError::MalformedResponse(_))));
    }

    #[test]
    fn test_element_missing_required_attribute_is_malformed() {
        let response = r#"[{"fieldName": "Name", "fieldType": "name"}]"#;
        let err = parse_llm_response(response).unwrap_err();
        match err {
            ExtractorError::MalformedResponse(msg) => assert!(msg.contains("currentValue")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        let err = parse_llm_response("[{\"fieldName\": }]").unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::MalformedResponse));
        match err {
            ExtractorError::MalformedResponse(msg) => assert!(msg.starts_with("JSON parse error")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_object_element_is_malformed() {
        let result = parse_llm_response(r#"["John Smith"]"#);
        assert!(matches!(result, Err(ExtractorError::MalformedResponse(_))));
    }

    #[test]
    fn test_numeric_value_and_position_are_accepted() {
        let response = r#"[{"fieldName":"Invoice","currentValue":4521,"fieldType":"number","position":27}]"#;
        let fields = parse_llm_response(response).unwrap();
        assert_eq!(fields[0].current_value, "4521");
        assert_eq!(fields[0].position, "27");
        assert!(fields[0].validation_rules.is_empty());
    }

    #[test]
    fn test_null_optionals_are_absent() {
        let response = r#"[{"fieldName":"Due","currentValue":"5 March","fieldType":"date","validationRules":null,"format":null}]"#;
        let fields = parse_llm_response(response).unwrap();
        assert!(fields[0].validation_rules.is_empty());
        assert_eq!(fields[0].format, "");
    }

    #[test]
    fn test_non_string_rule_is_malformed() {
        let response = r#"[{"fieldName":"Due","currentValue":"5 March","fieldType":"date","validationRules":[1]}]"#;
        assert!(parse_llm_response(response).is_err());
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"  [1, 2]  "#;
        assert_eq!(extract_json(json), "[1, 2]");
    }

    #[test]
    fn test_extract_json_single_line_fence() {
        assert_eq!(extract_json("```[1]```"), "[1]");
    }
}
