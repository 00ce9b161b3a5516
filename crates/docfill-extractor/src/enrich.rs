//! Field enrichment: context windows and default validation rules

use crate::config::ExtractorConfig;
use crate::context::ContextWindowResolver;
use docfill_domain::Field;
use tracing::warn;

/// Rule given to field types with no entry in the default table
pub const FALLBACK_RULE: &str = "must not be empty";

/// Default validation rules for a field type (case-insensitive)
///
/// # Examples
///
/// ```
/// use docfill_extractor::default_validation_rules;
///
/// assert_eq!(
///     default_validation_rules("Email"),
///     vec!["must be a valid email address", "must contain @ symbol"],
/// );
/// assert_eq!(default_validation_rules("colour"), vec!["must not be empty"]);
/// ```
pub fn default_validation_rules(field_type: &str) -> Vec<String> {
    let rules: &[&str] = match field_type.to_lowercase().as_str() {
        "date" => &["must be a valid date", "must be in format DD Month, YYYY"],
        "email" => &["must be a valid email address", "must contain @ symbol"],
        "phone" => &["must include country code", "must be in international format"],
        "name" => &["must not be empty", "should not contain numbers"],
        "address" => &["must include street address", "should include ZIP/postal code"],
        "amount" => &["must be a valid number", "should include currency symbol"],
        _ => &[FALLBACK_RULE],
    };
    rules.iter().map(|r| r.to_string()).collect()
}

/// Attaches context and default validation to parsed fields
pub struct FieldEnricher<'a> {
    config: &'a ExtractorConfig,
}

impl<'a> FieldEnricher<'a> {
    /// Create an enricher using the given configuration
    pub fn new(config: &'a ExtractorConfig) -> Self {
        Self { config }
    }

    /// Enrich every field against the document text
    ///
    /// Always succeeds. A value that cannot be found keeps empty context.
    pub fn enrich(&self, document: &str, fields: Vec<Field>) -> Vec<Field> {
        let resolver = ContextWindowResolver::new(document, self.config.context_words);

        fields
            .into_iter()
            .map(|field| self.enrich_field(&resolver, field))
            .collect()
    }

    fn enrich_field(&self, resolver: &ContextWindowResolver<'_>, mut field: Field) -> Field {
        let window = resolver.resolve(&field.current_value);

        field.full_context = format!(
            "...{}{}{}{}{}...",
            window.before.trim_start(),
            self.config.marker_open,
            field.current_value,
            self.config.marker_close,
            window.after.trim_end(),
        );
        field.context_before = window.before.trim().to_string();
        field.context_after = window.after.trim().to_string();
        if !field.has_context() {
            warn!(
                field = %field.field_name,
                "Value not found in document; keeping field without context"
            );
        }

        if field.validation_rules.is_empty() {
            field.validation_rules = default_validation_rules(&field.field_type);
        }

        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE: &str = "Dear John Smith, your invoice #4521 is due on 5 March, 2024.";

    fn enrich_one(field: Field) -> Field {
        let config = ExtractorConfig::default();
        FieldEnricher::new(&config)
            .enrich(INVOICE, vec![field])
            .remove(0)
    }

    #[test]
    fn test_customer_name_scenario() {
        let field = enrich_one(Field::new("Customer Name", "John Smith", "name"));

        assert_eq!(field.context_before, "Dear");
        assert_eq!(field.context_after, ", your invoice #4521 is due");
        assert_eq!(
            field.validation_rules,
            vec!["must not be empty", "should not contain numbers"]
        );
        assert_eq!(
            field.full_context,
            "...Dear 【John Smith】, your invoice #4521 is due..."
        );
    }

    #[test]
    fn test_missing_value_keeps_field() {
        let field = enrich_one(Field::new("Customer Name", "Jane Doe", "name"));

        assert_eq!(field.context_before, "");
        assert_eq!(field.context_after, "");
        assert_eq!(field.full_context, "...【Jane Doe】...");
        assert_eq!(field.field_name, "Customer Name");
        assert!(!field.has_context());
    }

    #[test]
    fn test_found_value_has_context() {
        assert!(enrich_one(Field::new("Invoice", "#4521", "reference")).has_context());
        assert!(enrich_one(Field::new("Due", "5 March, 2024", "date")).has_context());
    }

    #[test]
    fn test_model_rules_are_kept() {
        let mut field = Field::new("Due Date", "5 March, 2024", "date");
        field.validation_rules = vec!["must be in the future".to_string()];
        let field = enrich_one(field);

        assert_eq!(field.validation_rules, vec!["must be in the future"]);
        assert_eq!(field.context_before, "invoice #4521 is due on");
        assert_eq!(field.context_after, ".");
    }

    #[test]
    fn test_field_type_lookup_is_case_insensitive() {
        assert_eq!(default_validation_rules("DATE"), default_validation_rules("date"));
        assert_eq!(default_validation_rules("Amount"), default_validation_rules("amount"));
    }

    #[test]
    fn test_padded_field_type_gets_fallback() {
        assert_eq!(default_validation_rules(" date "), vec![FALLBACK_RULE]);
        assert_eq!(default_validation_rules("name\n"), vec![FALLBACK_RULE]);
    }

    #[test]
    fn test_every_known_type_has_rules() {
        for kind in ["date", "email", "phone", "name", "address", "amount"] {
            let rules = default_validation_rules(kind);
            assert!((1..=2).contains(&rules.len()), "{} has {} rules", kind, rules.len());
            assert_ne!(rules, vec![FALLBACK_RULE.to_string()], "{}", kind);
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let config = ExtractorConfig::default();
        let fields = FieldEnricher::new(&config).enrich(
            INVOICE,
            vec![
                Field::new("Invoice", "#4521", "number"),
                Field::new("Customer", "John Smith", "name"),
            ],
        );
        assert_eq!(fields[0].field_name, "Invoice");
        assert_eq!(fields[1].field_name, "Customer");
        assert_eq!(fields[0].validation_rules, vec![FALLBACK_RULE]);
    }
}
