//! Column resolution and display-width hints.

use tracing::debug;

use crate::error::ExportError;
use crate::record::Record;
use crate::request::ExportFormat;
use crate::value::normalize;

/// Upper bound for any column width hint, in characters.
pub const MAX_COLUMN_WIDTH: usize = 50;
/// Extra characters added to the widest cell of a column.
pub const COLUMN_WIDTH_PADDING: usize = 2;

/// One output column: the record key it reads, the label it shows, and an
/// optional fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub width: Option<usize>,
}

impl ColumnSpec {
    /// A column labelled with its own key.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            width: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Fix the width instead of measuring cells. Still capped at
    /// [`MAX_COLUMN_WIDTH`].
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// Resolve the ordered columns for `records`.
///
/// A non-empty `explicit` list is used verbatim and in order. Otherwise the
/// key order of the first record wins; with no records that fails with
/// [`ExportError::EmptyDataset`].
pub fn resolve_columns<S: AsRef<str>>(
    records: &[Record],
    explicit: Option<&[S]>,
) -> Result<Vec<ColumnSpec>, ExportError> {
    if let Some(headers) = explicit.filter(|h| !h.is_empty()) {
        return Ok(headers
            .iter()
            .map(|h| ColumnSpec::new(h.as_ref()))
            .collect());
    }

    let first = records.first().ok_or(ExportError::EmptyDataset)?;
    let columns: Vec<ColumnSpec> = first.keys().map(ColumnSpec::new).collect();
    debug!(count = columns.len(), "Inferred columns from first record");
    Ok(columns)
}

/// Width hint for one column:
/// `min(max(label length, longest cell) + 2, 50)`, measured in characters of
/// the workbook rendering of each cell.
pub fn column_width(column: &ColumnSpec, records: &[Record]) -> usize {
    if let Some(width) = column.width {
        return width.min(MAX_COLUMN_WIDTH);
    }

    let longest_cell = records
        .iter()
        .map(|r| normalize(r.cell(&column.key), ExportFormat::Xlsx).chars().count())
        .max()
        .unwrap_or(0);
    let widest = column.label.chars().count().max(longest_cell);

    (widest + COLUMN_WIDTH_PADDING).min(MAX_COLUMN_WIDTH)
}

pub fn column_widths(columns: &[ColumnSpec], records: &[Record]) -> Vec<usize> {
    columns.iter().map(|c| column_width(c, records)).collect()
}
