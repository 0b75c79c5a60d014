//! Tabular export engine: turns in-memory records into CSV text, a
//! print-ready HTML document, or an XLSX workbook, and hands the result to
//! an [`ArtifactSink`].

pub mod csv;
pub mod document;
pub mod error;
pub mod exporter;
pub mod headers;
pub mod record;
pub mod request;
pub mod sink;
pub mod value;
pub mod xlsx;

pub use crate::csv::{CSV_MIME, encode_csv};
pub use document::{DOCUMENT_MIME, render_document, render_table};
pub use error::{ErrorSeverity, ExportError};
pub use exporter::{DEFAULT_SHEET_NAME, ExportOutcome, Exporter};
pub use headers::{
    COLUMN_WIDTH_PADDING, ColumnSpec, MAX_COLUMN_WIDTH, column_width, column_widths,
    resolve_columns,
};
pub use record::Record;
pub use request::{ExportCategory, ExportFormat, ExportRequest, kebab_case, title_case};
pub use sink::{ArtifactSink, ExportArtifact, FileSink, MemorySink};
pub use value::{CellValue, WorkbookCell, normalize, workbook_cell};
pub use xlsx::{Sheet, WORKBOOK_MIME, build_single_sheet, build_workbook, sanitize_sheet_name};
