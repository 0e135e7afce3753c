//! Column mapping results.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::RuleSet;

/// Label used for columns that match no canonical field.
pub const UNMAPPED: &str = "Unmapped";

/// Where an input column ends up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingTarget {
    /// A canonical field name.
    Field(String),
    /// No canonical field matched.
    Unmapped,
}

impl MappingTarget {
    pub fn field(&self) -> Option<&str> {
        match self {
            MappingTarget::Field(name) => Some(name),
            MappingTarget::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, MappingTarget::Unmapped)
    }
}

impl fmt::Display for MappingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingTarget::Field(name) => write!(f, "{}", name),
            MappingTarget::Unmapped => write!(f, "{}", UNMAPPED),
        }
    }
}

/// How a mapping decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchMethod {
    /// Column equals the canonical name (case/space-insensitive).
    Exact,
    /// Column equals one of the field's aliases.
    Alias,
    /// Closest canonical name or alias by string similarity.
    Fuzzy { score: f64 },
    /// Suggested by a language model.
    Llm,
    /// No strategy matched.
    None,
}

impl MatchMethod {
    pub fn label(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Alias => "alias",
            MatchMethod::Fuzzy { .. } => "fuzzy",
            MatchMethod::Llm => "llm",
            MatchMethod::None => "none",
        }
    }
}

/// Mapping decision for a single input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDecision {
    pub target: MappingTarget,
    pub method: MatchMethod,
    /// Name of the resolver that produced the decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
}

impl MappingDecision {
    /// A decision for a column nothing matched.
    pub fn unmapped() -> Self {
        Self {
            target: MappingTarget::Unmapped,
            method: MatchMethod::None,
            resolver: None,
        }
    }
}

/// Input column name → mapping decision, in input column order.
///
/// Every input column appears exactly once, including unmapped ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    entries: IndexMap<String, MappingDecision>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision; a column already present keeps its first decision.
    pub fn insert(&mut self, column: impl Into<String>, decision: MappingDecision) {
        self.entries.entry(column.into()).or_insert(decision);
    }

    /// Decision for an input column.
    pub fn get(&self, column: &str) -> Option<&MappingDecision> {
        self.entries.get(column)
    }

    /// Target for an input column.
    pub fn target(&self, column: &str) -> Option<&MappingTarget> {
        self.entries.get(column).map(|d| &d.target)
    }

    /// All decisions in input column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingDecision)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Input columns mapped to a canonical field, with that field.
    pub fn mapped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(col, d)| d.target.field().map(|f| (col.as_str(), f)))
    }

    /// Input columns left unmapped.
    pub fn unmapped(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, d)| d.target.is_unmapped())
            .map(|(col, _)| col.as_str())
    }

    pub fn mapped_count(&self) -> usize {
        self.mapped().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required fields that no input column maps to, in catalog order.
    pub fn missing_required(&self, rules: &RuleSet) -> Vec<String> {
        let targets: HashSet<&str> = self.mapped().map(|(_, field)| field).collect();
        rules
            .required_fields()
            .filter(|rule| !targets.contains(rule.name.as_str()))
            .map(|rule| rule.name.clone())
            .collect()
    }

    /// Canonical fields that more than one input column maps to, with the
    /// competing columns in input order.
    pub fn duplicate_targets(&self) -> IndexMap<String, Vec<String>> {
        let mut by_field: IndexMap<String, Vec<String>> = IndexMap::new();
        for (column, field) in self.mapped() {
            by_field
                .entry(field.to_string())
                .or_default()
                .push(column.to_string());
        }
        by_field.retain(|_, columns| columns.len() > 1);
        by_field
    }

    /// Write the mapping as CSV: `Your Column,Mapped To,Method`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Your Column", "Mapped To", "Method"])?;
        for (column, decision) in self.iter() {
            let target = decision.target.to_string();
            csv.write_record([column, target.as_str(), decision.method.label()])?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
