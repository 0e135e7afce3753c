//! Blank data-entry workbook generated from a rule set.
//!
//! The first sheet has one column per field, headed
//! `<Field> (<Type>, required|optional)`, with spreadsheet data validation on
//! the entry rows. Reference lists live on a hidden `Lookups` sheet so the
//! dropdowns are not limited by Excel's inline list length.

use std::path::Path;

use rust_xlsxwriter::{
    ColNum, DataValidation, DataValidationErrorStyle, DataValidationRule, ExcelDateTime, Format,
    Formula, RowNum, Workbook, Worksheet, XlsxError,
};

use crate::error::{FieldmapError, Result};
use crate::rules::{FieldRule, FieldType, RuleSet};

/// Name of the data-entry sheet.
pub const TEMPLATE_SHEET: &str = "Template";
/// Name of the hidden sheet holding reference lists.
pub const LOOKUP_SHEET: &str = "Lookups";
/// Last spreadsheet row that carries validation.
pub const LAST_ENTRY_ROW: u32 = 1000;

const NUMBER_LIMIT: f64 = 1e15;

fn template_err(e: XlsxError) -> FieldmapError {
    FieldmapError::Template(e.to_string())
}

/// Header text for one field.
pub fn header_label(rule: &FieldRule) -> String {
    let requirement = if rule.required { "required" } else { "optional" };
    format!("{} ({}, {})", rule.name, rule.field_type, requirement)
}

/// Spreadsheet column letters for a zero-based index (0 → `A`, 26 → `AA`).
fn column_letters(mut col: ColNum) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Builds the template workbook.
pub struct TemplateBuilder<'a> {
    rules: &'a RuleSet,
    last_row: u32,
}

impl<'a> TemplateBuilder<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            last_row: LAST_ENTRY_ROW,
        }
    }

    /// Override the last validated row (1-based, header is row 1).
    pub fn with_last_row(mut self, last_row: u32) -> Self {
        self.last_row = last_row.max(2);
        self
    }

    /// Write the workbook to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = self.build()?;
        workbook.save(path).map_err(template_err)?;
        tracing::info!(path = %path.display(), fields = self.rules.len(), "wrote template");
        Ok(())
    }

    /// Render the workbook into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self.build()?;
        workbook.save_to_buffer().map_err(template_err)
    }

    fn build(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let mut sheet = Worksheet::new();
        sheet.set_name(TEMPLATE_SHEET).map_err(template_err)?;
        let mut lookups = Worksheet::new();
        lookups.set_name(LOOKUP_SHEET).map_err(template_err)?;
        lookups.set_hidden(true);

        let header = Format::new().set_bold();
        // Zero-based rows: row 0 is the header, so entry rows are 1..last_row-1.
        let first: RowNum = 1;
        let last: RowNum = self.last_row - 1;
        let mut lookup_col: ColNum = 0;

        for (index, rule) in self.rules.rules().enumerate() {
            let col = ColNum::try_from(index).map_err(|_| {
                FieldmapError::Template(format!("too many fields for one sheet: {}", index + 1))
            })?;
            let label = header_label(rule);
            sheet
                .write_string_with_format(0, col, &label, &header)
                .map_err(template_err)?;
            sheet
                .set_column_width(col, (label.chars().count() + 2) as f64)
                .map_err(template_err)?;

            let validation = if rule.has_reference_values() {
                let list = reference_validation(rule, &mut lookups, lookup_col)?;
                lookup_col += 1;
                Some(list)
            } else {
                type_validation(rule)?
            };
            if let Some(validation) = validation {
                sheet
                    .add_data_validation(first, col, last, col, &validation)
                    .map_err(template_err)?;
            }
        }
        sheet.set_freeze_panes(1, 0).map_err(template_err)?;

        workbook.push_worksheet(sheet);
        if lookup_col > 0 {
            workbook.push_worksheet(lookups);
        }
        Ok(workbook)
    }
}

/// Write the field's reference list into its own `Lookups` column and build a
/// dropdown pointing at it.
fn reference_validation(
    rule: &FieldRule,
    lookups: &mut Worksheet,
    col: ColNum,
) -> Result<DataValidation> {
    lookups.write_string(0, col, &rule.name).map_err(template_err)?;
    for (offset, value) in rule.reference_values.iter().enumerate() {
        lookups
            .write_string(offset as RowNum + 1, col, value)
            .map_err(template_err)?;
    }

    let letters = column_letters(col);
    let range = format!(
        "={}!${}$2:${}${}",
        LOOKUP_SHEET,
        letters,
        letters,
        rule.reference_values.len() + 1
    );
    DataValidation::new()
        .allow_list_formula(Formula::new(range))
        .set_error_title("Not in list")
        .and_then(|v| v.set_error_message(format!("Pick a value from the {} list.", rule.name)))
        .map_err(template_err)
}

fn type_validation(rule: &FieldRule) -> Result<Option<DataValidation>> {
    let validation = match rule.field_type {
        FieldType::Number => DataValidation::new()
            .allow_decimal_number(DataValidationRule::Between(-NUMBER_LIMIT, NUMBER_LIMIT))
            .set_error_message("Enter a number.")
            .map_err(template_err)?,
        FieldType::Date => {
            let earliest = ExcelDateTime::from_ymd(1900, 1, 1).map_err(template_err)?;
            DataValidation::new()
                .allow_date(DataValidationRule::GreaterThanOrEqualTo(earliest))
                .set_error_message("Enter a date on or after 1900-01-01.")
                .map_err(template_err)?
        }
        FieldType::Text | FieldType::Other(_) => return Ok(None),
    };
    Ok(Some(validation.set_error_style(DataValidationErrorStyle::Stop)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::new([
            (
                FieldRule::new("Asset ID", FieldType::Text).with_required(true),
                Vec::<&str>::new(),
            ),
            (FieldRule::new("Cost", FieldType::Number), Vec::new()),
            (FieldRule::new("Work Order Date", FieldType::Date), Vec::new()),
            (
                FieldRule::new("Priority", FieldType::Text).with_reference_values(["Low", "High"]),
                Vec::new(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_header_label() {
        let rule = FieldRule::new("Cost", FieldType::Number);
        assert_eq!(header_label(&rule), "Cost (Number, optional)");
        let rule = FieldRule::new("Asset ID", FieldType::Text).with_required(true);
        assert_eq!(header_label(&rule), "Asset ID (Text, required)");
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
    }

    #[test]
    fn test_builds_xlsx_bytes() {
        let bytes = TemplateBuilder::new(&rules()).to_bytes().unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_save_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        TemplateBuilder::new(&rules()).with_last_row(50).save(&path).unwrap();
        assert!(path.exists());
    }
}
