use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::ExportError;
use crate::headers::{ColumnSpec, column_widths, resolve_columns};
use crate::record::Record;
use crate::value::{WorkbookCell, workbook_cell};

/// Media type declared for workbook artifacts.
pub const WORKBOOK_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Excel sheet name maximum length.
pub const MAX_SHEET_NAME_LEN: usize = 31;
/// Characters not allowed in sheet names.
const ILLEGAL_SHEET_CHARS: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// A named table inside a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub records: Vec<Record>,
}

impl Sheet {
    /// A sheet whose columns are inferred from its first record. A sheet
    /// without records has no columns and is skipped by the builder.
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        let columns = resolve_columns::<&str>(&records, None).unwrap_or_default();
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    pub fn with_columns(
        name: impl Into<String>,
        columns: Vec<ColumnSpec>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Make `name` acceptable to Excel: illegal characters become `_`, blank
/// names become `Sheet`, and the result is cut to 31 characters.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        return "Sheet".to_string();
    }
    trimmed.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Build an XLSX workbook with one worksheet per non-empty sheet.
///
/// Sheets without records are left out entirely, unlike the CSV and
/// document paths which accept header-only output. When nothing is left,
/// [`ExportError::EmptyDataset`] is returned. Returns the raw bytes of the
/// xlsx file.
pub fn build_workbook(sheets: &[Sheet]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let mut written = 0usize;

    for sheet in sheets {
        if sheet.is_empty() {
            debug!(sheet = %sheet.name, "Skipping sheet without records");
            continue;
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sanitize_sheet_name(&sheet.name))?;
        write_sheet(worksheet, sheet, &header_format)?;
        written += 1;
    }

    if written == 0 {
        return Err(ExportError::EmptyDataset);
    }

    let bytes = workbook.save_to_buffer()?;
    debug!(sheets = written, bytes = bytes.len(), "Built workbook");
    Ok(bytes)
}

/// Single-sheet convenience over [`build_workbook`].
pub fn build_single_sheet(
    name: &str,
    columns: &[ColumnSpec],
    records: &[Record],
) -> Result<Vec<u8>, ExportError> {
    build_workbook(&[Sheet::with_columns(
        name,
        columns.to_vec(),
        records.to_vec(),
    )])
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    header_format: &Format,
) -> Result<(), ExportError> {
    // Header row
    for (col, column) in sheet.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, &column.label, header_format)?;
    }

    // Data rows
    for (row_idx, record) in sheet.records.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, column) in sheet.columns.iter().enumerate() {
            match workbook_cell(record.cell(&column.key)) {
                WorkbookCell::Blank => {}
                WorkbookCell::Number(n) => {
                    worksheet.write_number(excel_row, col_idx as u16, n)?;
                }
                WorkbookCell::Text(text) => {
                    worksheet.write_string(excel_row, col_idx as u16, &text)?;
                }
            }
        }
    }

    for (col, width) in column_widths(&sheet.columns, &sheet.records)
        .into_iter()
        .enumerate()
    {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn sheet_count(bytes: &[u8]) -> usize {
        read_part(bytes, "xl/workbook.xml").matches("<sheet ").count()
    }

    fn stock() -> Vec<Record> {
        vec![
            Record::new().with("item", "Urea").with("bags", 40),
            Record::new().with("item", "DAP").with("bags", 0),
        ]
    }

    #[test]
    fn test_build_single_sheet_basic() {
        let records = stock();
        let columns = resolve_columns::<&str>(&records, None).unwrap();
        let bytes = build_single_sheet("Stock", &columns, &records).unwrap();
        // XLSX files start with PK (zip format)
        assert_eq!(&bytes[0..2], b"PK");
        assert!(read_part(&bytes, "xl/workbook.xml").contains(r#"name="Stock""#));

        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("Urea"));
        assert!(strings.contains("item"));
    }

    #[test]
    fn test_numbers_are_numeric_cells() {
        let records = stock();
        let columns = resolve_columns::<&str>(&records, None).unwrap();
        let bytes = build_single_sheet("Stock", &columns, &records).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<v>40</v>"));
        assert!(sheet.contains("<v>0</v>"));
    }

    #[test]
    fn test_empty_sheet_is_skipped() {
        let sheets = vec![
            Sheet::new("A", vec![]),
            Sheet::new("B", vec![Record::new().with("x", 1)]),
        ];
        let bytes = build_workbook(&sheets).unwrap();
        assert_eq!(sheet_count(&bytes), 1);
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="B""#));
        assert!(!workbook.contains(r#"name="A""#));
    }

    #[test]
    fn test_all_sheets_empty_is_an_error() {
        let sheets = vec![Sheet::new("A", vec![]), Sheet::new("B", vec![])];
        let err = build_workbook(&sheets).unwrap_err();
        assert!(matches!(err, ExportError::EmptyDataset));
    }

    #[test]
    fn test_multi_sheet_keeps_order() {
        let sheets = vec![
            Sheet::new("Income", vec![Record::new().with("amount", 1500.5)]),
            Sheet::new("Stock", stock()),
        ];
        let bytes = build_workbook(&sheets).unwrap();
        let workbook = read_part(&bytes, "xl/workbook.xml");
        let income = workbook.find(r#"name="Income""#).unwrap();
        let stock = workbook.find(r#"name="Stock""#).unwrap();
        assert!(income < stock);
    }

    #[test]
    fn test_column_widths_are_set() {
        let bytes = build_workbook(&[Sheet::new("S", stock())]).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("customWidth=\"1\""));
    }

    #[test]
    fn test_duplicate_sheet_names_rejected_by_encoder() {
        let sheets = vec![Sheet::new("Same", stock()), Sheet::new("Same", stock())];
        let err = build_workbook(&sheets).unwrap_err();
        assert!(matches!(err, ExportError::Workbook(_)));
    }

    #[test]
    fn test_special_characters_in_cells() {
        let records = vec![
            Record::new().with("data", "Hello, \"World\""),
            Record::new().with("data", "Line1\nLine2"),
            Record::new().with("data", "<tag> & more"),
        ];
        let bytes = build_workbook(&[Sheet::new("Data", records)]).unwrap();
        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("&lt;tag"));
        assert!(strings.contains("&amp; more"));
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Income/Expense [2024]"), "Income_Expense _2024_");
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).chars().count(), 31);
        assert_eq!(sanitize_sheet_name("Stock"), "Stock");
    }

    #[test]
    fn test_sanitized_name_is_used() {
        let bytes = build_workbook(&[Sheet::new("Q1: Sales?", stock())]).unwrap();
        assert!(read_part(&bytes, "xl/workbook.xml").contains(r#"name="Q1_ Sales_""#));
    }

    #[test]
    fn test_large_dataset() {
        let records: Vec<Record> = (0..1000)
            .map(|i| Record::new().with("id", i).with("value", i as f64 * 1.5))
            .collect();
        let bytes = build_workbook(&[Sheet::new("Big", records)]).unwrap();
        assert!(bytes.len() > 1000);
    }
}
