use crate::request::ExportFormat;

/// Errors raised while building or delivering an export artifact.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to export")]
    EmptyDataset,

    #[error("Print surface unavailable: {0}")]
    RenderTargetUnavailable(String),

    #[error("Format {0} does not support multiple sheets")]
    UnsupportedFormat(ExportFormat),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// How loudly an error should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Log only.
    Low,
    /// Show to user, recoverable.
    Medium,
    /// Export failed.
    High,
}

impl ExportError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RenderTargetUnavailable(_) => ErrorSeverity::Low,
            Self::EmptyDataset | Self::UnsupportedFormat(_) => ErrorSeverity::Medium,
            Self::Csv(_) | Self::Workbook(_) | Self::Io(_) | Self::Encoding(_) => {
                ErrorSeverity::High
            }
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyDataset => "No data available to export.".into(),
            Self::RenderTargetUnavailable(_) => {
                "Could not open the print window. Allow popups and try again.".into()
            }
            Self::UnsupportedFormat(format) => {
                format!("Multiple sheets can only be exported as Excel, not {format}.")
            }
            Self::Io(e) => format!("Could not save the export: {e}"),
            Self::Csv(_) | Self::Workbook(_) | Self::Encoding(_) => {
                "The export could not be generated.".into()
            }
        }
    }
}
