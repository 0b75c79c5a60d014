use chrono::Local;
use harvest_core::config::HarvestConfig;
use harvest_core::notifications::{AppNotification, NotificationStore};
use tracing::{info, warn};

use crate::csv::encode_csv;
use crate::document::render_document;
use crate::error::ExportError;
use crate::headers::resolve_columns;
use crate::record::Record;
use crate::request::{ExportFormat, ExportRequest};
use crate::sink::{ArtifactSink, ExportArtifact};
use crate::xlsx::{Sheet, build_single_sheet, build_workbook};

/// Sheet name used when a single-sheet workbook request names none.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// What happened to an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The sink accepted the artifact.
    Delivered { filename: String },
    /// Nothing to export; a notice was recorded instead.
    NoData,
    /// The document was produced but no print surface could be opened.
    PrintUnavailable,
}

/// Entry point that turns an [`ExportRequest`] into an artifact and hands it
/// to the sink.
///
/// Each call builds its artifact from scratch; nothing carries over between
/// calls except the notices shown to the user.
pub struct Exporter<S> {
    product: String,
    sink: S,
    notifications: NotificationStore,
}

impl<S: ArtifactSink> Exporter<S> {
    pub fn new(product: impl Into<String>, sink: S) -> Self {
        Self {
            product: product.into(),
            sink,
            notifications: NotificationStore::new(),
        }
    }

    pub fn from_config(config: &HarvestConfig, sink: S) -> Self {
        Self::new(config.product_name.clone(), sink)
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// User-facing notices raised by past exports, newest first.
    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Export `records` in the requested format.
    ///
    /// CSV and document requests without records record a "no data" notice
    /// and return [`ExportOutcome::NoData`]. Workbook requests without
    /// records fail with [`ExportError::EmptyDataset`].
    pub fn export(
        &mut self,
        request: &ExportRequest,
        records: &[Record],
        title: Option<&str>,
    ) -> Result<ExportOutcome, ExportError> {
        let stem = request.file_stem(&self.product, Local::now().date_naive());
        let title = title.map_or_else(|| request.title(&self.product), str::to_string);
        info!(
            format = %request.format,
            category = %request.category,
            records = records.len(),
            "Export requested"
        );

        let artifact = match request.format {
            ExportFormat::Csv | ExportFormat::Pdf if records.is_empty() => {
                return Ok(self.no_data(&title));
            }
            ExportFormat::Csv => {
                let columns = resolve_columns(records, request.headers.as_deref())?;
                ExportArtifact::Csv {
                    filename: format!("{stem}.{}", request.format.extension()),
                    text: encode_csv(&columns, records)?,
                }
            }
            ExportFormat::Pdf => {
                let columns = resolve_columns(records, request.headers.as_deref())?;
                let markup = render_document(&title, &stem, &columns, records, &Local::now());
                ExportArtifact::Document {
                    filename: format!("{stem}.{}", request.format.extension()),
                    title,
                    markup,
                }
            }
            ExportFormat::Xlsx => {
                let columns = resolve_columns(records, request.headers.as_deref())?;
                let sheet_name = request.sheet_name.as_deref().unwrap_or(DEFAULT_SHEET_NAME);
                ExportArtifact::Workbook {
                    filename: format!("{stem}.{}", request.format.extension()),
                    bytes: build_single_sheet(sheet_name, &columns, records)?,
                }
            }
        };

        self.deliver(artifact)
    }

    /// Export several named sheets as one workbook. Only
    /// [`ExportFormat::Xlsx`] supports this.
    pub fn export_sheets(
        &mut self,
        request: &ExportRequest,
        sheets: &[Sheet],
    ) -> Result<ExportOutcome, ExportError> {
        if request.format != ExportFormat::Xlsx {
            return Err(ExportError::UnsupportedFormat(request.format));
        }

        let stem = request.file_stem(&self.product, Local::now().date_naive());
        info!(
            category = %request.category,
            sheets = sheets.len(),
            "Multi-sheet export requested"
        );

        let bytes = build_workbook(sheets)?;
        self.deliver(ExportArtifact::Workbook {
            filename: format!("{stem}.{}", request.format.extension()),
            bytes,
        })
    }

    fn no_data(&mut self, title: &str) -> ExportOutcome {
        info!(%title, "Nothing to export");
        self.notifications.push(
            AppNotification::info(ExportError::EmptyDataset.user_message()).with_title(title),
        );
        ExportOutcome::NoData
    }

    fn deliver(&mut self, artifact: ExportArtifact) -> Result<ExportOutcome, ExportError> {
        let filename = artifact.filename().to_string();
        match self.sink.deliver(artifact) {
            Ok(()) => {
                info!(%filename, "Export delivered");
                Ok(ExportOutcome::Delivered { filename })
            }
            Err(ExportError::RenderTargetUnavailable(reason)) => {
                warn!(%filename, %reason, "Print surface unavailable; skipping print");
                self.notifications.push(
                    AppNotification::warning(format!(
                        "{filename} was saved but could not be opened for printing: {reason}"
                    )),
                );
                Ok(ExportOutcome::PrintUnavailable)
            }
            Err(e) => Err(e),
        }
    }
}
