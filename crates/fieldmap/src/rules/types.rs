//! Field rule definitions.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Declared type of a target field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Free text; every value is accepted.
    Text,
    /// Numeric values.
    Number,
    /// Date or date-time values.
    Date,
    /// Any type name the rules table uses that we don't recognize.
    /// Values pass through unvalidated.
    Other(String),
}

impl FieldType {
    /// Interpret a `Type` cell from the rules table.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "string" | "str" => FieldType::Text,
            "number" | "numeric" | "integer" | "int" | "float" | "decimal" => FieldType::Number,
            "date" | "datetime" | "date/time" => FieldType::Date,
            _ => FieldType::Other(raw.trim().to_string()),
        }
    }

    /// True for Text, Number and Date.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "Text"),
            FieldType::Number => write!(f, "Number"),
            FieldType::Date => write!(f, "Date"),
            FieldType::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Validation rule for one canonical target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Canonical field name, unique within a rule set.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value must be present in every row.
    pub required: bool,
    /// Allowed values; empty means unconstrained.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub reference_values: IndexSet<String>,
}

impl FieldRule {
    /// Create an optional, unconstrained rule.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            reference_values: IndexSet::new(),
        }
    }

    /// Set whether the field is required.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the allowed values.
    pub fn with_reference_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the field restricts values to a reference list.
    pub fn has_reference_values(&self) -> bool {
        !self.reference_values.is_empty()
    }

    /// Check a value against the reference list (exact, case-sensitive, trimmed).
    pub fn allows(&self, value: &str) -> bool {
        self.reference_values.is_empty() || self.reference_values.contains(value.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_type() {
        assert_eq!(FieldType::parse("Text"), FieldType::Text);
        assert_eq!(FieldType::parse(" number "), FieldType::Number);
        assert_eq!(FieldType::parse("DATE"), FieldType::Date);
        assert_eq!(FieldType::parse("Integer"), FieldType::Number);
        assert_eq!(
            FieldType::parse("Currency"),
            FieldType::Other("Currency".to_string())
        );
        assert!(!FieldType::parse("Currency").is_recognized());
    }

    #[test]
    fn test_reference_check_is_case_sensitive_and_trimmed() {
        let rule = FieldRule::new("Asset", FieldType::Text)
            .with_reference_values(["Pump", "Motor", "Valve"]);

        assert!(rule.allows("Pump"));
        assert!(rule.allows("  Motor "));
        assert!(!rule.allows("pump"));
        assert!(!rule.allows("Compressor"));
    }

    #[test]
    fn test_unconstrained_rule_allows_anything() {
        let rule = FieldRule::new("Notes", FieldType::Text);
        assert!(!rule.has_reference_values());
        assert!(rule.allows("whatever"));
    }
}
