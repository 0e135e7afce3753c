//! Rule and synonym catalogs.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::types::FieldRule;
use crate::error::{FieldmapError, Result};

/// Normalize a column name or alias for comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Alias sets keyed by canonical field name.
///
/// Aliases are stored normalized (trimmed, lower-cased). A canonical name
/// always matches itself and is not stored as an alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymCatalog {
    entries: IndexMap<String, IndexSet<String>>,
}

impl SynonymCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register aliases for a canonical field; blank aliases are dropped.
    pub fn insert<I, S>(&mut self, field: impl Into<String>, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.entries.entry(field.into()).or_default();
        for alias in aliases {
            let alias = normalize_name(alias.as_ref());
            if !alias.is_empty() {
                set.insert(alias);
            }
        }
    }

    /// Aliases for a canonical field.
    pub fn aliases(&self, field: &str) -> Option<&IndexSet<String>> {
        self.entries.get(field)
    }

    /// True when the normalized column equals the lower-cased field name.
    pub fn is_exact(&self, field: &str, normalized_column: &str) -> bool {
        normalize_name(field) == normalized_column
    }

    /// True when the normalized column is one of the field's aliases.
    pub fn is_alias(&self, field: &str, normalized_column: &str) -> bool {
        self.entries
            .get(field)
            .is_some_and(|aliases| aliases.contains(normalized_column))
    }

    /// Iterate canonical fields with their aliases in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The loaded rule catalog: ordered field names, per-field rules and aliases.
///
/// Read-only once built. Iteration order is the rules table's row order and
/// decides mapping tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: IndexMap<String, FieldRule>,
    synonyms: SynonymCatalog,
}

impl RuleSet {
    /// Build a rule set from rules paired with their aliases.
    ///
    /// Fails on blank or duplicate field names.
    pub fn new<I, A, S>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (FieldRule, A)>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = IndexMap::new();
        let mut synonyms = SynonymCatalog::new();

        for (mut rule, aliases) in definitions {
            rule.name = rule.name.trim().to_string();
            if rule.name.is_empty() {
                return Err(FieldmapError::MalformedRules(
                    "field name must not be blank".to_string(),
                ));
            }
            if rules.contains_key(&rule.name) {
                return Err(FieldmapError::MalformedRules(format!(
                    "duplicate field name '{}'",
                    rule.name
                )));
            }
            synonyms.insert(rule.name.clone(), aliases);
            rules.insert(rule.name.clone(), rule);
        }

        Ok(Self { rules, synonyms })
    }

    /// Canonical field names in catalog order.
    pub fn field_names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Look up a rule by canonical name.
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rules in catalog order.
    pub fn rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.values()
    }

    /// Rules marked required, in catalog order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.values().filter(|r| r.required)
    }

    pub fn synonyms(&self) -> &SynonymCatalog {
        &self.synonyms
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
