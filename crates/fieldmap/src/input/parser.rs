//! Delimited-text and spreadsheet parser.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::source::{DataTable, SourceMetadata};
use crate::error::{FieldmapError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Extensions read through the spreadsheet backend.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use for text files (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Worksheet to read from spreadsheets (None = first sheet).
    pub sheet: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            sheet: None,
        }
    }
}

/// Parses tabular data files into [`DataTable`]s.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    ///
    /// Spreadsheets are detected by extension; everything else is treated as
    /// delimited text. Any failure to produce a table is reported as
    /// [`FieldmapError::UnreadableInput`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| FieldmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| FieldmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let (table, format) = if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            (self.parse_spreadsheet(path)?, extension)
        } else {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(&contents)
                    .ok_or_else(|| FieldmapError::unreadable(path, "file is empty"))?,
            };
            let table = self
                .parse_bytes(&contents, delimiter)
                .map_err(|e| match e {
                    FieldmapError::UnreadableInput { message, .. } => {
                        FieldmapError::unreadable(path, message)
                    }
                    other => FieldmapError::unreadable(path, other.to_string()),
                })?;
            (table, delimiter_format(delimiter).to_string())
        };

        tracing::debug!(
            path = %path.display(),
            format = %format,
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed input table"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse delimited text held in memory.
    ///
    /// A data row with content past the last header column is
    /// [`FieldmapError::UnreadableInput`]: its cells cannot be placed.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let headers: Vec<String> = if self.config.has_header {
            match records.next() {
                Some(record) => record?.iter().map(|s| s.trim().to_string()).collect(),
                None => return Err(FieldmapError::Config("no header row found".to_string())),
            }
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for (row_idx, result) in records.enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            let row = record.iter().map(|s| s.to_string()).collect::<Vec<_>>();
            if self.config.has_header {
                check_row_width(&row, headers.len(), row_idx + 2)
                    .map_err(|message| FieldmapError::unreadable(PathBuf::new(), message))?;
            }
            rows.push(row);
        }

        let headers = if self.config.has_header {
            headers
        } else {
            let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
            (0..width).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() {
            return Err(FieldmapError::Config("no columns found".to_string()));
        }

        Ok(DataTable::new(headers, rows))
    }

    /// Read one worksheet through calamine.
    fn parse_spreadsheet(&self, path: &Path) -> Result<DataTable> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| FieldmapError::unreadable(path, e.to_string()))?;

        let sheet_name = match &self.config.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| FieldmapError::unreadable(path, "workbook has no worksheets"))?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| FieldmapError::unreadable(path, e.to_string()))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(render_cell).collect::<Vec<_>>());

        let headers: Vec<String> = if self.config.has_header {
            rows.next()
                .ok_or_else(|| FieldmapError::unreadable(path, "worksheet is empty"))?
                .into_iter()
                .map(|h| h.trim().to_string())
                .collect()
        } else {
            (0..range.width()).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() {
            return Err(FieldmapError::unreadable(path, "no columns found"));
        }

        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let data: Vec<Vec<String>> = rows.take(limit).collect();
        if self.config.has_header {
            for (row_idx, row) in data.iter().enumerate() {
                check_row_width(row, headers.len(), row_idx + 2)
                    .map_err(|message| FieldmapError::unreadable(path, message))?;
            }
        }

        Ok(DataTable::new(headers, data))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Short rows are padded later; trailing blank cells are tolerated.
fn check_row_width(
    row: &[String],
    width: usize,
    row_number: usize,
) -> std::result::Result<(), String> {
    let used = row
        .iter()
        .rposition(|cell| !cell.trim().is_empty())
        .map_or(0, |last| last + 1);
    if used > width {
        return Err(format!(
            "row {} has {} fields but the header has {}",
            row_number, used, width
        ));
    }
    Ok(())
}

fn delimiter_format(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Render a spreadsheet cell the way it would appear in a CSV export.
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => render_float(*f),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(render_datetime)
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn render_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn render_datetime(value: NaiveDateTime) -> String {
    if value.time().num_seconds_from_midnight() == 0 && value.time().nanosecond() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Option<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return None;
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a small bonus since
        // it rarely shows up inside values.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Some(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data), Some(b','));
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data), Some(b'\t'));
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;notes\n\"Pump, main\";ok\n\"Valve, a, b\";bad";
        assert_eq!(detect_delimiter(data), Some(b';'));
    }

    #[test]
    fn test_detect_delimiter_empty() {
        assert_eq!(detect_delimiter(b"\n\n"), None);
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let data = b"name,age,city\nAlice,30,NYC\nBob,25,LA";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.headers, vec!["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 0), Some("Alice"));
        assert_eq!(table.get(1, 1), Some("25"));
    }

    #[test]
    fn test_parse_header_only_is_empty_table() {
        let parser = Parser::new();
        let table = parser.parse_bytes(b"WO Date,Asset\n", b',').unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_parse_strips_bom_and_trims_headers() {
        let parser = Parser::new();
        let table = parser
            .parse_bytes(b"\xEF\xBB\xBF WO Date ,Asset\n2024-01-05,Pump\n", b',')
            .unwrap();
        assert_eq!(table.headers, vec!["WO Date", "Asset"]);
    }

    #[test]
    fn test_parse_short_rows_padded() {
        let parser = Parser::new();
        let table = parser.parse_bytes(b"a,b,c\n1\n1,2,3,,\n", b',').unwrap();
        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parse_row_wider_than_header_is_unreadable() {
        let parser = Parser::new();
        let err = parser
            .parse_bytes(b"Asset,Notes,Cost\nPump,ok,10\nPump,leaky, seal,100\n", b',')
            .unwrap_err();
        assert!(matches!(err, FieldmapError::UnreadableInput { .. }));
        assert!(err.to_string().contains("row 3 has 4 fields but the header has 3"));
    }

    #[test]
    fn test_parse_file_row_wider_than_header_names_path() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(b"Asset,Cost\nPump,leaky,100\n").unwrap();

        let err = Parser::new().parse_file(file.path()).unwrap_err();
        match err {
            FieldmapError::UnreadableInput { path, message } => {
                assert_eq!(path, file.path());
                assert_eq!(message, "row 2 has 3 fields but the header has 2");
            }
            other => panic!("expected unreadable input, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_without_header() {
        let parser = Parser::with_config(ParserConfig {
            has_header: false,
            ..ParserConfig::default()
        });
        let table = parser.parse_bytes(b"1,2\n3,4\n", b',').unwrap();
        assert_eq!(table.headers, vec!["column_1", "column_2"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let table = parser.parse_bytes(b"a\n1\n2\n3\n", b',').unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_parse_file_reports_metadata() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        file.write_all(b"a\tb\n1\t2\n").unwrap();

        let (table, meta) = Parser::new().parse_file(file.path()).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(meta.format, "tsv");
        assert_eq!(meta.row_count, 1);
        assert!(meta.hash.starts_with("sha256:"));
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(b"a,b\n\xff\xfe,2\n").unwrap();

        let err = Parser::new().parse_file(file.path()).unwrap_err();
        assert!(matches!(err, FieldmapError::UnreadableInput { .. }));
    }

    #[test]
    fn test_broken_workbook_is_unreadable() {
        let mut file = NamedTempFile::with_suffix(".xlsx").unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();

        let err = Parser::new().parse_file(file.path()).unwrap_err();
        assert!(matches!(err, FieldmapError::UnreadableInput { .. }));
    }

    #[test]
    fn test_empty_file_is_unreadable() {
        let file = NamedTempFile::with_suffix(".csv").unwrap();
        let err = Parser::new().parse_file(file.path()).unwrap_err();
        assert!(err.is_fatal_input());
    }

    #[test]
    fn test_render_cells() {
        assert_eq!(render_cell(&Data::Float(5.0)), "5");
        assert_eq!(render_cell(&Data::Float(2.5)), "2.5");
        assert_eq!(render_cell(&Data::Int(7)), "7");
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::String("Pump".into())), "Pump");
    }
}
