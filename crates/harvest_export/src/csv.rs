use tracing::debug;

use crate::error::ExportError;
use crate::headers::ColumnSpec;
use crate::record::Record;
use crate::request::ExportFormat;
use crate::value::normalize;

/// Media type declared for CSV artifacts.
pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// Encode `records` as CSV text under the labels of `columns`.
///
/// A cell is quoted only when it contains a comma, a double quote or a line
/// break; embedded quotes are doubled. Rows are separated by `\n` and the
/// text has no trailing newline. Zero records yields the header row alone.
pub fn encode_csv(columns: &[ColumnSpec], records: &[Record]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.label.as_str()))?;

    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|c| normalize(record.cell(&c.key), ExportFormat::Csv)),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    let mut text =
        String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))?;

    // The writer terminates every row; only separators are wanted.
    if text.ends_with('\n') {
        text.pop();
    }

    debug!(rows = records.len(), bytes = text.len(), "Encoded CSV");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::resolve_columns;

    fn parse(input: &str) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_quotes_commas_and_doubles_quotes() {
        let records = vec![
            Record::new().with("name", "Wheat, Organic").with("qty", 10),
            Record::new().with("name", "Rice").with("qty", "5\"kg"),
        ];
        let columns = resolve_columns(&records, Some(&["name", "qty"][..])).unwrap();
        let text = encode_csv(&columns, &records).unwrap();
        assert_eq!(text, "name,qty\n\"Wheat, Organic\",10\nRice,\"5\"\"kg\"");
    }

    #[test]
    fn test_header_only_output() {
        let columns = resolve_columns(&[], Some(&["A", "B"][..])).unwrap();
        let text = encode_csv(&columns, &[]).unwrap();
        assert_eq!(text, "A,B");
    }

    #[test]
    fn test_missing_keys_render_empty() {
        let records = vec![
            Record::new().with("a", 1).with("b", 2),
            Record::new().with("a", 3),
        ];
        let columns = resolve_columns::<&str>(&records, None).unwrap();
        let text = encode_csv(&columns, &records).unwrap();
        assert_eq!(text, "a,b\n1,2\n3,");
    }

    #[test]
    fn test_zero_quantity_is_kept() {
        let records = vec![Record::new().with("crop", "Millet").with("qty", 0)];
        let columns = resolve_columns::<&str>(&records, None).unwrap();
        let text = encode_csv(&columns, &records).unwrap();
        assert_eq!(text, "crop,qty\nMillet,0");
    }

    #[test]
    fn test_uses_labels_for_header_row() {
        let records = vec![Record::new().with("qty_kg", 5)];
        let columns = vec![ColumnSpec::new("qty_kg").with_label("Quantity (kg)")];
        let text = encode_csv(&columns, &records).unwrap();
        assert_eq!(text, "Quantity (kg)\n5");
    }

    #[test]
    fn test_round_trip_through_reader() {
        let tricky = [
            "plain",
            "comma, inside",
            "say \"hello\"",
            "line one\nline two",
            "carriage\r\nreturn",
            "",
            "  padded  ",
            "₹1,23,456.00",
        ];
        let records: Vec<Record> = tricky
            .iter()
            .enumerate()
            .map(|(i, v)| Record::new().with("id", i as i64).with("note", *v))
            .collect();
        let columns = resolve_columns::<&str>(&records, None).unwrap();
        let text = encode_csv(&columns, &records).unwrap();

        let (headers, rows) = parse(&text);
        assert_eq!(headers, vec!["id", "note"]);
        assert_eq!(rows.len(), tricky.len());
        for (row, expected) in rows.iter().zip(tricky) {
            assert_eq!(row[1], expected);
        }
    }
}
