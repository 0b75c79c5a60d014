//! Export requests and the naming rules derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    /// Print-ready document; the host's print surface produces the PDF.
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }

    /// Extension of the artifact actually produced for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "html",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" | "print" | "html" => Ok(Self::Pdf),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Which history the exported records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportCategory {
    Income,
    Stock,
    Report,
}

impl ExportCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Stock => "Stock",
            Self::Report => "Report",
        }
    }
}

impl fmt::Display for ExportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "stock" => Ok(Self::Stock),
            "report" | "generic" => Ok(Self::Report),
            other => Err(format!("unknown export category: {other}")),
        }
    }
}

/// One export call's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub category: ExportCategory,
    /// Free-text report type, e.g. `"crop sales"` or `"monthlySummary"`.
    pub report_type: String,
    pub format: ExportFormat,
    pub headers: Option<Vec<String>>,
    pub sheet_name: Option<String>,
    /// Date stamped into the filename; today when unset.
    pub date: Option<NaiveDate>,
}

impl ExportRequest {
    pub fn new(
        category: ExportCategory,
        report_type: impl Into<String>,
        format: ExportFormat,
    ) -> Self {
        Self {
            category,
            report_type: report_type.into(),
            format,
            headers: None,
            sheet_name: None,
            date: None,
        }
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// `{Product}_{Category}_{kebab-type}_{YYYY-MM-DD}`, without extension.
    /// Always a single path component.
    pub fn file_stem(&self, product: &str, today: NaiveDate) -> String {
        let date = self.date.unwrap_or(today).format("%Y-%m-%d").to_string();
        let product: String = product
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') { c } else { '-' })
            .collect();
        let kebab = kebab_case(&self.report_type);
        [product.as_str(), self.category.label(), kebab.as_str(), date.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }

    /// `{Product} {Title Case Type} {Category}`.
    pub fn title(&self, product: &str) -> String {
        let titled = title_case(&self.report_type);
        [product, titled.as_str(), self.category.label()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split on anything that is not a letter or digit, and on lower-to-upper
/// camel case boundaries.
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in input.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn kebab_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn title_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
