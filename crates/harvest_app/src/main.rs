//! `harvest`: export farm records from JSON as CSV, a printable document or
//! an Excel workbook.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{error, info};

use harvest_core::config::HarvestConfig;
use harvest_core::locale::{format_currency, parse_date};
use harvest_core::logging;
use harvest_export::{
    CellValue, ExportCategory, ExportError, ExportFormat, ExportOutcome, ExportRequest, Exporter,
    FileSink, Record, Sheet,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(
    name = "harvest",
    version,
    about = "Export farm records as CSV, a printable document, or an Excel workbook",
    long_about = "Export farm records as CSV, a printable document, or an Excel workbook.\n\n\
                  Input is a JSON array of flat objects, or with --multi-sheet an array of\n\
                  {\"name\": ..., \"data\": [...]} sheets."
)]
struct Cli {
    /// JSON file holding the records to export.
    #[arg(long, short, value_name = "FILE")]
    input: PathBuf,

    /// Output format: csv, pdf (printable HTML) or xlsx.
    #[arg(long, short)]
    format: ExportFormat,

    /// History the records belong to: income, stock or report.
    #[arg(long, short)]
    category: ExportCategory,

    /// Report type used in the filename and title, e.g. "crop sales".
    #[arg(long = "report-type", short = 't', value_name = "TEXT", default_value = "")]
    report_type: String,

    /// Explicit column order (comma separated). Defaults to the first record's keys.
    #[arg(long, value_delimiter = ',')]
    headers: Vec<String>,

    /// Worksheet name for single-sheet xlsx exports.
    #[arg(long = "sheet-name")]
    sheet_name: Option<String>,

    /// Document title (defaults to "<Product> <Report Type> <Category>").
    #[arg(long)]
    title: Option<String>,

    /// Treat the input as a list of named sheets (xlsx only).
    #[arg(long = "multi-sheet")]
    multi_sheet: bool,

    /// Columns holding dates to format per target (comma separated).
    #[arg(long = "date-columns", value_delimiter = ',')]
    date_columns: Vec<String>,

    /// Numeric columns to format as rupees before export (comma separated).
    #[arg(long = "currency-columns", value_delimiter = ',')]
    currency_columns: Vec<String>,

    /// Directory to write artifacts to (overrides the config).
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.harvest/config.json.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SheetInput {
    name: String,
    #[serde(default)]
    data: Vec<Record>,
}

fn load_config(path: Option<&Path>) -> Result<HarvestConfig> {
    match path {
        Some(path) => HarvestConfig::load_from_path(path),
        None => HarvestConfig::load(),
    }
}

fn build_request(cli: &Cli) -> ExportRequest {
    let mut request = ExportRequest::new(cli.category, cli.report_type.clone(), cli.format);
    if !cli.headers.is_empty() {
        request = request.with_headers(cli.headers.iter().cloned());
    }
    if let Some(name) = &cli.sheet_name {
        request = request.with_sheet_name(name.clone());
    }
    request
}

/// Apply the caller-side conversions the engine never infers: date parsing
/// and rupee formatting.
fn prepare_records(
    mut records: Vec<Record>,
    date_columns: &[String],
    currency_columns: &[String],
) -> Result<Vec<Record>> {
    for (index, record) in records.iter_mut().enumerate() {
        for key in date_columns {
            let Some(cell) = record.get_mut(key) else {
                continue;
            };
            if let CellValue::Text(text) = cell {
                let date = if text.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Date(
                        parse_date(text)
                            .with_context(|| format!("Record {index}, column {key:?}"))?,
                    )
                };
                *cell = date;
            }
        }

        for key in currency_columns {
            let Some(cell) = record.get_mut(key) else {
                continue;
            };
            let amount = match cell {
                CellValue::Integer(n) => Some(*n as f64),
                CellValue::Number(n) => Some(*n),
                _ => None,
            };
            if let Some(amount) = amount {
                *cell = CellValue::Text(format_currency(amount));
            }
        }
    }
    Ok(records)
}

fn run(cli: &Cli, config: &HarvestConfig) -> Result<String> {
    let output_dir = match &cli.output_dir {
        Some(dir) => dir.clone(),
        None => config.resolved_output_dir()?,
    };
    let mut sink = FileSink::new(&output_dir);
    if let Some(command) = &config.print_command {
        sink = sink.with_print_command(command.clone());
    }
    let mut exporter = Exporter::from_config(config, sink);
    let request = build_request(cli);

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input: {}", cli.input.display()))?;

    let outcome = if cli.multi_sheet {
        let inputs: Vec<SheetInput> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse sheets: {}", cli.input.display()))?;
        let sheets = inputs
            .into_iter()
            .map(|input| {
                let records =
                    prepare_records(input.data, &cli.date_columns, &cli.currency_columns)?;
                Ok(Sheet::new(input.name, records))
            })
            .collect::<Result<Vec<_>>>()?;
        exporter.export_sheets(&request, &sheets)?
    } else {
        let records: Vec<Record> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse records: {}", cli.input.display()))?;
        let records = prepare_records(records, &cli.date_columns, &cli.currency_columns)?;
        exporter.export(&request, &records, cli.title.as_deref())?
    };

    let message = match outcome {
        ExportOutcome::Delivered { filename } => output_dir.join(filename).display().to_string(),
        ExportOutcome::NoData => exporter
            .notifications()
            .latest()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| ExportError::EmptyDataset.user_message()),
        ExportOutcome::PrintUnavailable => exporter
            .notifications()
            .latest()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "Document saved, but it could not be printed.".to_string()),
    };
    Ok(message)
}

fn user_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ExportError>() {
        Some(export_error) => export_error.user_message(),
        None => format!("{error:#}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init_logging(&config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: file logging disabled: {e:#}");
            None
        }
    };
    info!("Starting harvest v{VERSION}");

    match run(&cli, &config) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Export failed: {e:#}");
            eprintln!("error: {}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}
