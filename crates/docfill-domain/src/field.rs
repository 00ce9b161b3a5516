//! Field module - a single template field extracted from a document

use serde::{Deserialize, Serialize};

/// A template field: a value in a document that is likely to change between
/// reuses of that document.
///
/// The first seven attributes come from the AI model and are untrusted.
/// `context_before`, `context_after` and `full_context` are derived from the
/// source text during enrichment and are never taken from the model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Human readable name (e.g. "Customer Name")
    pub field_name: String,

    /// The value as it appears in the source document (best effort)
    pub current_value: String,

    /// Kind of data (name, date, address, ...)
    pub field_type: String,

    /// Position hint reported by the model
    #[serde(default)]
    pub position: String,

    /// Validation rules; backfilled from defaults when the model gives none
    #[serde(default)]
    pub validation_rules: Vec<String>,

    /// Names of related fields
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Expected format description
    #[serde(default)]
    pub format: String,

    /// Words immediately preceding the value in the document
    #[serde(default)]
    pub context_before: String,

    /// Words immediately following the value in the document
    #[serde(default)]
    pub context_after: String,

    /// Display string with the value marked inside its context
    #[serde(default)]
    pub full_context: String,
}

impl Field {
    /// Create a field with the three attributes the model must always supply
    pub fn new(
        field_name: impl Into<String>,
        current_value: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            current_value: current_value.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    /// Whether enrichment has attached any surrounding context
    pub fn has_context(&self) -> bool {
        !self.context_before.is_empty() || !self.context_after.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_uses_camel_case_names() {
        let field = Field::new("Customer Name", "John Smith", "name");
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(json["fieldName"], "Customer Name");
        assert_eq!(json["currentValue"], "John Smith");
        assert_eq!(json["fieldType"], "name");
        assert!(json.get("contextBefore").is_some());
    }

    #[test]
    fn test_enrichment_attributes_default_when_absent() {
        let json = r#"{"fieldName":"Due","currentValue":"5 March","fieldType":"date"}"#;
        let field: Field = serde_json::from_str(json).unwrap();

        assert_eq!(field.context_before, "");
        assert!(field.validation_rules.is_empty());
        assert!(!field.has_context());
    }
}
