//! Column resolution strategies.

use serde::{Deserialize, Serialize};

use super::decision::MatchMethod;
use crate::error::Result;
use crate::rules::{normalize_name, RuleSet};

/// What a resolver knows about an input column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnContext {
    /// Column name as it appears in the input header.
    pub name: String,
    /// A few non-blank values from the column.
    #[serde(default)]
    pub samples: Vec<String>,
}

impl ColumnContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }

    /// Trimmed, lower-cased column name.
    pub fn normalized(&self) -> String {
        normalize_name(&self.name)
    }
}

/// A resolver's answer for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Canonical field name; always a member of the rule set.
    pub field: String,
    pub method: MatchMethod,
}

/// Strategy that resolves an input column name to a canonical field.
///
/// Implementations must be deterministic for a fixed input and must only
/// return fields present in `rules`.
pub trait ColumnResolver: Send + Sync {
    /// Short name for logging and mapping reports.
    fn name(&self) -> &str;

    /// Resolve a column, or `Ok(None)` when nothing matches.
    fn resolve(&self, column: &ColumnContext, rules: &RuleSet) -> Result<Option<Resolution>>;
}

/// Exact-name and alias matcher. The default strategy.
///
/// Fields are tested in catalog order; the first field whose lower-cased name
/// or alias set contains the normalized column wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynonymResolver;

impl ColumnResolver for SynonymResolver {
    fn name(&self) -> &str {
        "synonym"
    }

    fn resolve(&self, column: &ColumnContext, rules: &RuleSet) -> Result<Option<Resolution>> {
        let normalized = column.normalized();
        let synonyms = rules.synonyms();

        for rule in rules.rules() {
            let method = if synonyms.is_exact(&rule.name, &normalized) {
                MatchMethod::Exact
            } else if synonyms.is_alias(&rule.name, &normalized) {
                MatchMethod::Alias
            } else {
                continue;
            };
            return Ok(Some(Resolution {
                field: rule.name.clone(),
                method,
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FieldRule, FieldType};

    fn rules() -> RuleSet {
        RuleSet::new([
            (
                FieldRule::new("Work Order Date", FieldType::Date),
                vec!["wo date", "order date"],
            ),
            (FieldRule::new("Order Date", FieldType::Date), vec!["date"]),
            (FieldRule::new("Asset", FieldType::Text), vec!["equipment"]),
        ])
        .unwrap()
    }

    fn resolve(column: &str) -> Option<Resolution> {
        SynonymResolver
            .resolve(&ColumnContext::new(column), &rules())
            .unwrap()
    }

    #[test]
    fn test_alias_match_is_case_and_space_insensitive() {
        let res = resolve("  WO Date ").unwrap();
        assert_eq!(res.field, "Work Order Date");
        assert_eq!(res.method, MatchMethod::Alias);
    }

    #[test]
    fn test_exact_match() {
        let res = resolve("ASSET").unwrap();
        assert_eq!(res.field, "Asset");
        assert_eq!(res.method, MatchMethod::Exact);
    }

    #[test]
    fn test_catalog_order_breaks_ties() {
        // "order date" is an alias of the first field and the exact name of
        // the second; the first field in catalog order wins.
        let res = resolve("Order Date").unwrap();
        assert_eq!(res.field, "Work Order Date");
        assert_eq!(res.method, MatchMethod::Alias);
    }

    #[test]
    fn test_no_match() {
        assert!(resolve("random_notes").is_none());
    }
}
