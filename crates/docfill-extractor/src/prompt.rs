//! LLM prompt construction for template field extraction

/// Builds the extraction prompt for a document
pub struct PromptBuilder<'a> {
    document: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder over the document text
    pub fn new(document: &'a str) -> Self {
        Self { document }
    }

    /// Build the complete extraction prompt
    ///
    /// The document is embedded verbatim after the instructions.
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + OUTPUT_FORMAT.len() + self.document.len() + 32,
        );

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT);
        prompt.push_str("\n\nDocument text:\n");
        prompt.push_str(self.document);
        prompt.push('\n');

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"Analyze the document text below and identify every field whose value would
need to change when the document is reused as a template.

For each field:
1. Give the value exactly as it is written in the document
2. Describe what kind of data it is (name, date, email, phone, address, amount, ...)
3. Describe where in the document it appears
4. Suggest validation rules
5. List any other fields it depends on
6. Describe the expected format"#;

const OUTPUT_FORMAT: &str = r#"Return a JSON array of objects with these properties:
[
  {
    "fieldName": "human readable name",
    "currentValue": "value copied verbatim from the document",
    "fieldType": "type of data",
    "position": "where the value appears in the document",
    "validationRules": ["rule1", "rule2"],
    "dependencies": ["related field names"],
    "format": "expected format description"
  }
]"#;
