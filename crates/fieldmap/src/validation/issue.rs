//! Validation issues and the issue log.

use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Display row of the first data row: row 1 is the header.
pub const FIRST_DATA_ROW: usize = 2;

/// Convert a zero-based data row index into the spreadsheet row number.
pub fn row_locator(row_index: usize) -> usize {
    row_index + FIRST_DATA_ROW
}

/// Category of a cell-level problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Required field with a blank or missing value.
    MissingRequired,
    /// Value could not be parsed as a date.
    InvalidDate,
    /// Value could not be parsed as a number.
    InvalidNumber,
    /// Value could not be carried as text.
    InvalidText,
    /// Value is not in the field's reference list.
    ReferenceMismatch,
}

impl IssueKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::MissingRequired => "Missing required value",
            IssueKind::InvalidDate => "Invalid date format",
            IssueKind::InvalidNumber => "Invalid number",
            IssueKind::InvalidText => "Invalid text",
            IssueKind::ReferenceMismatch => "Reference mismatch",
        }
    }
}

/// One detected problem. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Spreadsheet row number (header is row 1).
    pub row: usize,
    /// Source column name as it appears in the input.
    pub column: String,
    /// Canonical field the column maps to.
    pub field: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Human-readable description.
    pub issue: String,
}

impl ValidationIssue {
    pub fn new(
        row: usize,
        column: impl Into<String>,
        field: impl Into<String>,
        kind: IssueKind,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            row,
            column: column.into(),
            field: field.into(),
            kind,
            issue: issue.into(),
        }
    }
}

/// Ordered list of issues: column by column in mapping order, then row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueLog {
    issues: Vec<ValidationIssue>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// An empty log means the run found nothing to report.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues for one source column.
    pub fn for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.column == column)
    }

    /// Counts per kind, keyed by the kind's serialized name.
    pub fn count_by_kind(&self) -> IndexMap<IssueKind, usize> {
        let mut counts = IndexMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Write the full log as CSV with header `Row,Column,Issue`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Row", "Column", "Issue"])?;
        for issue in &self.issues {
            let row = issue.row.to_string();
            csv.write_record([row.as_str(), issue.column.as_str(), issue.issue.as_str()])?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn into_vec(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

impl<'a> IntoIterator for &'a IssueLog {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_locator_offsets_header() {
        assert_eq!(row_locator(0), 2);
        assert_eq!(row_locator(9), 11);
    }

    #[test]
    fn test_count_by_kind() {
        let mut log = IssueLog::new();
        log.push(ValidationIssue::new(2, "a", "A", IssueKind::InvalidDate, "Invalid date format"));
        log.push(ValidationIssue::new(3, "a", "A", IssueKind::InvalidDate, "Invalid date format"));
        log.push(ValidationIssue::new(3, "b", "B", IssueKind::MissingRequired, "Missing required value"));

        let counts = log.count_by_kind();
        assert_eq!(counts[&IssueKind::InvalidDate], 2);
        assert_eq!(counts[&IssueKind::MissingRequired], 1);
        assert_eq!(log.for_column("b").count(), 1);
    }

    #[test]
    fn test_write_csv_quotes_commas() {
        let mut log = IssueLog::new();
        log.push(ValidationIssue::new(
            4,
            "Asset",
            "Asset",
            IssueKind::ReferenceMismatch,
            "Value 'Pump, big' not in reference list for 'Asset'",
        ));

        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Row,Column,Issue\n4,Asset,\"Value 'Pump, big' not in reference list for 'Asset'\"\n"
        );
    }

    #[test]
    fn test_empty_log_writes_header_only() {
        let mut out = Vec::new();
        IssueLog::new().write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Row,Column,Issue\n");
    }
}
