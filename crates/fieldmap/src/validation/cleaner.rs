//! The validation engine: cleans mapped columns and collects issues.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::coerce::{clean_cell, CellValue};
use super::issue::{row_locator, IssueKind, IssueLog, ValidationIssue};
use crate::error::{FieldmapError, Result};
use crate::input::DataTable;
use crate::mapping::ColumnMapping;
use crate::rules::RuleSet;

/// Output table keyed by canonical field name.
///
/// Holds only columns that were mapped to a known rule. Every column has
/// exactly `row_count` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedTable {
    columns: IndexMap<String, Vec<CellValue>>,
    row_count: usize,
}

impl CleanedTable {
    /// An empty table sized for `row_count` rows.
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: IndexMap::new(),
            row_count,
        }
    }

    /// Store a fully processed column, replacing any earlier column for the
    /// same field in place.
    fn set_column(&mut self, field: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.row_count);
        self.columns.insert(field.to_string(), values);
    }

    pub fn column(&self, field: &str) -> Option<&[CellValue]> {
        self.columns.get(field).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn get(&self, row: usize, field: &str) -> Option<&CellValue> {
        self.columns.get(field).and_then(|c| c.get(row))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when no column was mapped.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render back into a string table, e.g. to feed it through validation again.
    pub fn to_data_table(&self) -> DataTable {
        let headers = self.columns.keys().cloned().collect();
        let rows = (0..self.row_count)
            .map(|row| {
                self.columns
                    .values()
                    .map(|col| col[row].to_string())
                    .collect()
            })
            .collect();
        DataTable::new(headers, rows)
    }

    /// Write as delimited text. Missing markers become empty cells. A table
    /// without columns writes nothing.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let mut csv = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        csv.write_record(self.columns.keys())?;
        for row in 0..self.row_count {
            csv.write_record(self.columns.values().map(|col| col[row].to_string()))?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write to a file as comma-separated text.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| FieldmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write_csv(file, b',')
    }
}

/// Per-field tallies for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub field: String,
    /// Source columns mapped to this field, in mapping order.
    pub source_columns: Vec<String>,
    /// Cells examined.
    pub cells: usize,
    pub missing_required: usize,
    pub invalid_type: usize,
    pub reference_mismatches: usize,
}

impl FieldSummary {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, kind: IssueKind) {
        match kind {
            IssueKind::MissingRequired => self.missing_required += 1,
            IssueKind::InvalidDate | IssueKind::InvalidNumber | IssueKind::InvalidText => {
                self.invalid_type += 1
            }
            IssueKind::ReferenceMismatch => self.reference_mismatches += 1,
        }
    }

    pub fn issue_count(&self) -> usize {
        self.missing_required + self.invalid_type + self.reference_mismatches
    }
}

/// Output of [`ValidationEngine::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub cleaned: CleanedTable,
    pub issues: IssueLog,
    pub field_summaries: Vec<FieldSummary>,
}

/// Applies field rules to mapped columns.
///
/// Columns are processed in mapping order and rows in table order. Unmapped
/// columns and columns mapped to unknown fields are skipped without a trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Validate and clean `table` according to `mapping` and `rules`.
    pub fn validate(
        &self,
        table: &DataTable,
        mapping: &ColumnMapping,
        rules: &RuleSet,
    ) -> ValidationReport {
        let mut cleaned = CleanedTable::new(table.row_count());
        let mut issues = IssueLog::new();
        let mut summaries: IndexMap<String, FieldSummary> = IndexMap::new();

        for (source_column, field) in mapping.mapped() {
            let Some(rule) = rules.get(field) else {
                continue;
            };
            let Some(index) = table.column_index(source_column) else {
                tracing::warn!(column = source_column, "mapped column not present in table");
                continue;
            };

            let summary = summaries
                .entry(field.to_string())
                .or_insert_with(|| FieldSummary::new(field));
            summary.source_columns.push(source_column.to_string());

            let mut values = Vec::with_capacity(table.row_count());
            for (row_idx, raw) in table.column_values(index).enumerate() {
                let outcome = clean_cell(raw, rule);
                summary.cells += 1;
                for problem in outcome.problems {
                    summary.record(problem.kind);
                    issues.push(ValidationIssue::new(
                        row_locator(row_idx),
                        source_column,
                        field,
                        problem.kind,
                        problem.message,
                    ));
                }
                values.push(outcome.value);
            }

            tracing::debug!(
                column = source_column,
                field = field,
                issues = summary.issue_count(),
                "cleaned column"
            );
            cleaned.set_column(field, values);
        }

        ValidationReport {
            cleaned,
            issues,
            field_summaries: summaries.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SynonymMapper;
    use crate::rules::{FieldRule, FieldType};

    fn run(rules: &RuleSet, table: &DataTable) -> ValidationReport {
        let mapping = SynonymMapper::new().map_table(table, rules);
        ValidationEngine::new().validate(table, &mapping, rules)
    }

    #[test]
    fn test_scenario_required_date() {
        let rules = RuleSet::new([(
            FieldRule::new("Work Order Date", FieldType::Date).with_required(true),
            vec!["wo date", "order date"],
        )])
        .unwrap();
        let table = DataTable::from_rows(&["WO Date"], &[&["2024-01-05"], &["not-a-date"], &[""]]);

        let report = run(&rules, &table);
        let issues: Vec<_> = report
            .issues
            .iter()
            .map(|i| (i.row, i.column.as_str(), i.issue.as_str()))
            .collect();
        assert_eq!(
            issues,
            vec![
                (3, "WO Date", "Invalid date format"),
                (4, "WO Date", "Missing required value"),
            ]
        );

        let column = report.cleaned.column("Work Order Date").unwrap();
        assert_eq!(column[0].to_string(), "2024-01-05");
        assert!(column[1].is_missing());
        assert!(column[2].is_missing());
    }

    #[test]
    fn test_scenario_reference_values() {
        let rules = RuleSet::new([(
            FieldRule::new("Asset", FieldType::Text).with_reference_values(["Pump", "Motor", "Valve"]),
            Vec::<&str>::new(),
        )])
        .unwrap();
        let table = DataTable::from_rows(&["Asset"], &[&["Compressor"], &["Pump"]]);

        let report = run(&rules, &table);
        assert_eq!(report.issues.len(), 1);
        let issue = report.issues.iter().next().unwrap();
        assert_eq!(issue.row, 2);
        assert_eq!(issue.issue, "Value 'Compressor' not in reference list for 'Asset'");
        assert_eq!(report.field_summaries[0].reference_mismatches, 1);
    }

    #[test]
    fn test_unmapped_columns_excluded() {
        let rules = RuleSet::new([(FieldRule::new("Asset", FieldType::Text), Vec::<&str>::new())])
            .unwrap();
        let table = DataTable::from_rows(&["random_notes", "Asset"], &[&["", "Pump"]]);

        let report = run(&rules, &table);
        assert_eq!(report.cleaned.column_names(), vec!["Asset"]);
        assert!(report.issues.for_column("random_notes").next().is_none());
    }

    #[test]
    fn test_mapping_to_unknown_field_skipped() {
        let rules = RuleSet::new([(FieldRule::new("Asset", FieldType::Text), Vec::<&str>::new())])
            .unwrap();
        let other = RuleSet::new([(FieldRule::new("Cost", FieldType::Number), Vec::<&str>::new())])
            .unwrap();
        let table = DataTable::from_rows(&["Cost"], &[&["abc"]]);

        let mapping = SynonymMapper::new().map_table(&table, &other);
        let report = ValidationEngine::new().validate(&table, &mapping, &rules);
        assert!(report.cleaned.is_empty());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_number_column_coerced() {
        let rules = RuleSet::new([(FieldRule::new("Cost", FieldType::Number), vec!["amount"])])
            .unwrap();
        let table = DataTable::from_rows(&["Amount"], &[&["1,200"], &["12.50"], &["n/a"], &["ten"]]);

        let report = run(&rules, &table);
        let rendered: Vec<String> = report
            .cleaned
            .column("Cost")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(rendered, vec!["1200", "12.5", "", ""]);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues.iter().next().unwrap().row, 5);
    }

    #[test]
    fn test_duplicate_target_last_column_wins() {
        let rules = RuleSet::new([(FieldRule::new("Asset", FieldType::Text), vec!["equipment"])])
            .unwrap();
        let table = DataTable::from_rows(&["Asset", "Equipment"], &[&["A-1", "E-1"]]);

        let report = run(&rules, &table);
        assert_eq!(report.cleaned.column_count(), 1);
        assert_eq!(report.cleaned.get(0, "Asset").unwrap().to_string(), "E-1");
        assert_eq!(
            report.field_summaries[0].source_columns,
            vec!["Asset", "Equipment"]
        );
    }

    #[test]
    fn test_issue_order_is_column_then_row() {
        let rules = RuleSet::new([
            (FieldRule::new("A", FieldType::Number), Vec::<&str>::new()),
            (FieldRule::new("B", FieldType::Number), Vec::new()),
        ])
        .unwrap();
        let table = DataTable::from_rows(&["B", "A"], &[&["x", "y"], &["x", "y"]]);

        let report = run(&rules, &table);
        let order: Vec<_> = report.issues.iter().map(|i| (i.column.as_str(), i.row)).collect();
        assert_eq!(order, vec![("B", 2), ("B", 3), ("A", 2), ("A", 3)]);
    }

    #[test]
    fn test_cleaned_csv_output() {
        let rules = RuleSet::new([
            (FieldRule::new("Work Order Date", FieldType::Date), vec!["wo date"]),
            (FieldRule::new("Cost", FieldType::Number), Vec::new()),
        ])
        .unwrap();
        let table = DataTable::from_rows(&["WO Date", "Cost"], &[&["01/05/2024", "5.0"], &["bad", ""]]);

        let report = run(&rules, &table);
        let mut out = Vec::new();
        report.cleaned.write_csv(&mut out, b',').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Work Order Date,Cost\n2024-01-05,5\n,\n"
        );
    }

    #[test]
    fn test_empty_cleaned_table_writes_nothing() {
        let mut out = Vec::new();
        CleanedTable::new(3).write_csv(&mut out, b',').unwrap();
        assert!(out.is_empty());
    }
}
