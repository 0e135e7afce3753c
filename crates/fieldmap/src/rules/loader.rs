//! Builds a [`RuleSet`] from a field-definition table.

use std::path::Path;

use indexmap::IndexSet;

use super::catalog::RuleSet;
use super::types::{FieldRule, FieldType};
use crate::error::{FieldmapError, Result};
use crate::input::{DataTable, Parser, ParserConfig};

/// Column holding the canonical field name.
pub const FIELD_NAME_COLUMN: &str = "Field Name";
/// Column holding the declared type.
pub const TYPE_COLUMN: &str = "Type";
/// Column holding the required flag.
pub const REQUIRED_COLUMN: &str = "Required";
/// Column holding `;`-separated aliases.
pub const SYNONYMS_COLUMN: &str = "Synonyms";
/// Optional column holding `;`-separated allowed values.
pub const REFERENCE_VALUES_COLUMN: &str = "Reference Values";

const REQUIRED_COLUMNS: &[&str] = &[
    FIELD_NAME_COLUMN,
    TYPE_COLUMN,
    REQUIRED_COLUMN,
    SYNONYMS_COLUMN,
];

/// Loads rule catalogs from rules tables.
///
/// Stateless: every call builds a fresh [`RuleSet`].
pub struct RuleSetLoader {
    parser: Parser,
}

impl RuleSetLoader {
    /// Create a loader with default parser settings.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    /// Create a loader with custom parser settings.
    pub fn with_parser_config(config: ParserConfig) -> Self {
        Self {
            parser: Parser::with_config(config),
        }
    }

    /// Read a rules file (CSV or spreadsheet) and build the catalog.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<RuleSet> {
        let path = path.as_ref();
        let (table, _) = self.parser.parse_file(path)?;
        let rules = Self::load_table(&table)?;
        tracing::info!(
            path = %path.display(),
            fields = rules.len(),
            "loaded field rules"
        );
        Ok(rules)
    }

    /// Build the catalog from an already-parsed rules table.
    ///
    /// Fails with [`FieldmapError::MalformedRules`] when a required column is
    /// missing or any row has a blank field name; no partial catalog is
    /// returned. Rows that are blank in every cell are skipped.
    pub fn load_table(table: &DataTable) -> Result<RuleSet> {
        let mut positions = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for &column in REQUIRED_COLUMNS {
            let index = find_column(table, column).ok_or_else(|| {
                FieldmapError::MalformedRules(format!("missing required column '{}'", column))
            })?;
            positions.push(index);
        }
        let (name_idx, type_idx, required_idx, synonyms_idx) =
            (positions[0], positions[1], positions[2], positions[3]);
        let reference_idx = find_column(table, REFERENCE_VALUES_COLUMN);

        let mut definitions = Vec::with_capacity(table.row_count());

        for (row_idx, row) in table.rows.iter().enumerate() {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

            let name = cell(name_idx).trim();
            if name.is_empty() {
                return Err(FieldmapError::MalformedRules(format!(
                    "blank '{}' in row {}",
                    FIELD_NAME_COLUMN,
                    row_idx + 2
                )));
            }

            let mut rule = FieldRule::new(name, FieldType::parse(cell(type_idx)))
                .with_required(parse_required(cell(required_idx)));
            if let Some(idx) = reference_idx {
                rule.reference_values = parse_reference_values(cell(idx));
            }

            definitions.push((rule, parse_synonyms(cell(synonyms_idx))));
        }

        if definitions.is_empty() {
            return Err(FieldmapError::MalformedRules(
                "rules table defines no fields".to_string(),
            ));
        }

        RuleSet::new(definitions)
    }
}

impl Default for RuleSetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Header lookup, trimmed and case-insensitive.
fn find_column(table: &DataTable, name: &str) -> Option<usize> {
    table
        .headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Truthiness of a `Required` cell.
pub fn parse_required(raw: &str) -> bool {
    let value = raw.trim();
    if DataTable::is_null_value(value) {
        return false;
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "x" | "required" | "mandatory" => true,
        "false" | "no" | "n" | "optional" => false,
        other => match other.parse::<f64>() {
            Ok(number) => number != 0.0,
            Err(_) => true,
        },
    }
}

/// Split a `Synonyms` cell on `;`; pieces are trimmed and lower-cased.
pub fn parse_synonyms(raw: &str) -> Vec<String> {
    if DataTable::is_null_value(raw) {
        return Vec::new();
    }
    raw.split(';')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a `Reference Values` cell on `;`.
///
/// Blank, `none`, `n/a` and cells without any alphanumeric character mean
/// "no constraint" and yield an empty set.
pub fn parse_reference_values(raw: &str) -> IndexSet<String> {
    let trimmed = raw.trim();
    if DataTable::is_null_value(trimmed) || !trimmed.chars().any(char::is_alphanumeric) {
        return IndexSet::new();
    }
    trimmed
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
