//! Cell values and their per-format display forms.

use chrono::NaiveDate;
use harvest_core::locale::{format_date_long, format_date_short};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use std::fmt;

use crate::request::ExportFormat;

/// A single cell of a [`Record`](crate::record::Record).
///
/// `Empty` is the only value that renders blank: `0`, `false` and `""` are
/// real values and are always written out.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// A cell as written into a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkbookCell {
    /// Nothing is written.
    Blank,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Render `value` the way it should appear in `format`.
///
/// Dates use the long form (`5 March 2024`) in documents and the short form
/// (`05/03/2024`) in CSV and workbooks. No currency detection happens here.
pub fn normalize(value: &CellValue, format: ExportFormat) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Integer(n) => n.to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Date(date) => match format {
            ExportFormat::Pdf => format_date_long(*date),
            ExportFormat::Csv | ExportFormat::Xlsx => format_date_short(*date),
        },
    }
}

/// Typed worksheet cell for `value`: numbers stay numeric, everything else
/// is written as its workbook display string.
pub fn workbook_cell(value: &CellValue) -> WorkbookCell {
    match value {
        CellValue::Empty => WorkbookCell::Blank,
        CellValue::Integer(n) => WorkbookCell::Number(*n as f64),
        CellValue::Number(n) if n.is_finite() => WorkbookCell::Number(*n),
        other => WorkbookCell::Text(normalize(other, ExportFormat::Xlsx)),
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CellValueVisitor)
    }
}

struct CellValueVisitor;

impl<'de> Visitor<'de> for CellValueVisitor {
    type Value = CellValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
        Ok(CellValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
        Ok(CellValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
        Ok(i64::try_from(v).map_or(CellValue::Number(v as f64), CellValue::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
        Ok(CellValue::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
        Ok(CellValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<CellValue, E> {
        Ok(CellValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Empty)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<CellValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        CellValue::deserialize(deserializer)
    }
}
