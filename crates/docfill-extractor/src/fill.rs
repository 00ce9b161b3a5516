//! Substitute new values into the original document

use serde::{Deserialize, Serialize};

/// One value to swap out of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    /// Text as it appears in the document
    pub current_value: String,
    /// Text to put in its place
    pub new_value: String,
}

impl Replacement {
    /// Create a replacement
    pub fn new(current_value: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            current_value: current_value.into(),
            new_value: new_value.into(),
        }
    }
}

/// Replace every literal occurrence of each value, in the order given
///
/// Later replacements see the output of earlier ones. Empty current values
/// are skipped.
///
/// # Examples
///
/// ```
/// use docfill_extractor::{fill_template, Replacement};
///
/// let filled = fill_template(
///     "Dear John Smith, pay $12.50",
///     &[Replacement::new("John Smith", "Ada Lovelace"), Replacement::new("$12.50", "$99")],
/// );
/// assert_eq!(filled, "Dear Ada Lovelace, pay $99");
/// ```
pub fn fill_template(document: &str, replacements: &[Replacement]) -> String {
    replacements
        .iter()
        .filter(|r| !r.current_value.is_empty())
        .fold(document.to_string(), |text, r| {
            text.replace(&r.current_value, &r.new_value)
        })
}
