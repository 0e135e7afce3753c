//! Per-cell checks and type coercion.
//!
//! [`clean_cell`] is a pure function of the raw value and the field rule, so
//! every cell can be tested in isolation and one bad cell never affects
//! another.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::issue::IssueKind;
use crate::input::DataTable;
use crate::rules::{FieldRule, FieldType};

static THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%m/%d/%y",
];

/// A cleaned cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Missing-value marker.
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A problem found in one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellProblem {
    pub kind: IssueKind,
    pub message: String,
}

impl CellProblem {
    fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            message: kind.label().to_string(),
        }
    }
}

/// Result of cleaning one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellOutcome {
    pub value: CellValue,
    pub problems: Vec<CellProblem>,
}

/// Check and coerce one raw value against its field rule.
///
/// Order of checks:
/// 1. Missing values in required fields get one `MissingRequired` problem
///    and nothing else runs.
/// 2. Type coercion. Missing optional values stay [`CellValue::Missing`];
///    date/number failures leave a missing marker.
/// 3. Reference list, on the trimmed raw value, whatever step 2 decided.
pub fn clean_cell(raw: &str, rule: &FieldRule) -> CellOutcome {
    let missing = DataTable::is_null_value(raw);
    if missing && rule.required {
        return CellOutcome {
            value: CellValue::Missing,
            problems: vec![CellProblem::new(IssueKind::MissingRequired)],
        };
    }

    let mut problems = Vec::new();

    let value = match &rule.field_type {
        _ if missing => CellValue::Missing,
        FieldType::Date => parse_date(raw).unwrap_or_else(|| {
            problems.push(CellProblem::new(IssueKind::InvalidDate));
            CellValue::Missing
        }),
        FieldType::Number => parse_number(raw).map(CellValue::Number).unwrap_or_else(|| {
            problems.push(CellProblem::new(IssueKind::InvalidNumber));
            CellValue::Missing
        }),
        FieldType::Text => coerce_text(raw).unwrap_or_else(|| {
            problems.push(CellProblem::new(IssueKind::InvalidText));
            CellValue::Missing
        }),
        FieldType::Other(_) => CellValue::Text(raw.to_string()),
    };

    if !rule.allows(raw) {
        problems.push(CellProblem {
            kind: IssueKind::ReferenceMismatch,
            message: format!(
                "Value '{}' not in reference list for '{}'",
                raw.trim(),
                rule.name
            ),
        });
    }

    CellOutcome { value, problems }
}

/// Parse a date or date-time into a normalized value.
pub fn parse_date(raw: &str) -> Option<CellValue> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(normalize_datetime(dt.naive_local()));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            if plausible_year(dt.year()) {
                return Some(normalize_datetime(dt));
            }
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if plausible_year(date.year()) {
                return Some(CellValue::Date(date));
            }
        }
    }

    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
            return Some(CellValue::Date(date));
        }
    }

    None
}

/// Parse a number. Accepts a leading `$` and `,` thousands separators;
/// rejects non-finite results.
pub fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim();
    let (sign, rest) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value.strip_prefix('+').unwrap_or(value)),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);

    let digits = if rest.contains(',') {
        if !THOUSANDS.is_match(rest) {
            return None;
        }
        rest.replace(',', "")
    } else {
        rest.to_string()
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    format!("{}{}", sign, digits)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Text coercion. Values with embedded NUL characters are refused since no
/// downstream text column can hold them.
fn coerce_text(raw: &str) -> Option<CellValue> {
    if raw.contains('\0') {
        None
    } else {
        Some(CellValue::Text(raw.to_string()))
    }
}

/// Shortest display form: integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn normalize_datetime(dt: NaiveDateTime) -> CellValue {
    let dt = dt.with_nanosecond(0).unwrap_or(dt);
    if dt.time().num_seconds_from_midnight() == 0 {
        CellValue::Date(dt.date())
    } else {
        CellValue::DateTime(dt)
    }
}

fn plausible_year(year: i32) -> bool {
    (1000..=9999).contains(&year)
}
