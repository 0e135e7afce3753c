//! Cell cleaning and the validation engine.
//!
//! [`clean_cell`] is the pure per-cell function; [`ValidationEngine`] drives
//! it over every mapped column and collects an [`IssueLog`].

mod cleaner;
mod coerce;
mod issue;

pub use cleaner::{CleanedTable, FieldSummary, ValidationEngine, ValidationReport};
pub use coerce::{
    clean_cell, format_number, parse_date, parse_number, CellOutcome, CellProblem, CellValue,
};
pub use issue::{row_locator, IssueKind, IssueLog, ValidationIssue, FIRST_DATA_ROW};
