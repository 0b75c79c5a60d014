//! Ordered records: one logical row of export data.

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

use crate::value::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// An ordered mapping from column key to cell value.
///
/// Keys keep their insertion order, which is what header inference relies
/// on. Deserializing from a JSON object keeps the object's key order.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: IndexMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CellValue> {
        self.fields.get_mut(key)
    }

    /// The value under `key`, or [`CellValue::Empty`] when the key is missing.
    pub fn cell(&self, key: &str) -> &CellValue {
        self.get(key).unwrap_or(&EMPTY_CELL)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Column order is part of a record's identity.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields.iter().eq(other.fields.iter())
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of column names to scalar values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Record, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut record = Record {
            fields: IndexMap::with_capacity(map.size_hint().unwrap_or(0).min(256)),
        };
        while let Some((key, value)) = map.next_entry::<String, CellValue>()? {
            record.insert(key, value);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let record = Record::new()
            .with("zone", "North")
            .with("crop", "Wheat")
            .with("acres", 12);
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["zone", "crop", "acres"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new().with("a", 1).with("b", 2);
        record.insert("a", 10);
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&CellValue::Integer(10)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_missing_key_reads_as_empty() {
        let record = Record::new().with("a", 1);
        assert!(record.get("b").is_none());
        assert_eq!(record.cell("b"), &CellValue::Empty);
    }

    #[test]
    fn test_get_mut() {
        let mut record = Record::new().with("price", 250.0);
        if let Some(cell) = record.get_mut("price") {
            *cell = CellValue::from("₹250.00");
        }
        assert_eq!(record.cell("price"), &CellValue::Text("₹250.00".into()));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab = Record::new().with("a", 1).with("b", 2);
        let ba = Record::new().with("b", 2).with("a", 1);
        assert_ne!(ab, ba);
        assert_eq!(ab, Record::new().with("a", 1).with("b", 2));
    }

    #[test]
    fn test_wide_record_lookup() {
        let record: Record = (0..500i64).map(|i| (format!("col_{i}"), i)).collect();
        assert_eq!(record.len(), 500);
        assert_eq!(record.cell("col_499"), &CellValue::Integer(499));
        assert_eq!(record.keys().next(), Some("col_0"));
    }

    #[test]
    fn test_from_iterator() {
        let record: Record = vec![("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.cell("y"), &CellValue::Integer(2));
    }

    #[test]
    fn test_deserialize_keeps_json_key_order() {
        let record: Record =
            serde_json::from_str(r#"{"zeta": 1, "alpha": "a", "mid": null}"#).unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(record.cell("mid"), &CellValue::Empty);
    }

    #[test]
    fn test_deserialize_rejects_non_objects() {
        let result: Result<Record, _> = serde_json::from_str("[1, 2]");
        assert!(result.is_err());
    }
}
