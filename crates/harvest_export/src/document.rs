//! Print-ready HTML rendering of a record table.
//!
//! The output is a complete, self-contained document. Turning it into a PDF
//! is left to whatever print surface the host opens it in.

use chrono::{DateTime, TimeZone};
use harvest_core::locale::format_timestamp;
use std::fmt::{Display, Write};
use tracing::debug;

use crate::headers::ColumnSpec;
use crate::record::Record;
use crate::request::ExportFormat;
use crate::value::normalize;

/// Media type declared for rendered documents.
pub const DOCUMENT_MIME: &str = "text/html;charset=utf-8";

const STYLESHEET: &str = r#"
        @page { size: A4 landscape; margin: 12mm; }
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 2rem; color: #333; }
        header { margin-bottom: 1.5rem; }
        h1 { font-size: 1.5rem; margin: 0 0 0.5rem 0; color: #2e7d32; }
        .meta { font-size: 0.85rem; color: #666; margin: 0.15rem 0; }
        table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
        th, td { border: 1px solid #ddd; padding: 6px 8px; text-align: left; vertical-align: top; }
        th { background-color: #e8f5e9; font-weight: 600; }
        tbody tr:nth-child(even) { background-color: #fafafa; }
        thead { display: table-header-group; }
        tr { page-break-inside: avoid; }
        @media print { body { margin: 0; } }
"#;

/// Render the document for one export.
///
/// Every piece of text (title, filename, labels and cells) is HTML-escaped.
/// Cells use the long date form. Zero records produce a header-only table.
pub fn render_document<Tz>(
    title: &str,
    filename: &str,
    columns: &[ColumnSpec],
    records: &[Record],
    generated_at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let body = format!(
        "<header>\n    <h1>{title}</h1>\n    <p class=\"meta\">Generated on {generated}</p>\n    <p class=\"meta\">File: {filename}</p>\n</header>\n{table}",
        title = escape_html(title),
        generated = escape_html(&format_timestamp(generated_at)),
        filename = escape_html(filename),
        table = render_table(columns, records),
    );

    debug!(rows = records.len(), columns = columns.len(), "Rendered document");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLESHEET}    </style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// Render just the `<table>` element.
pub fn render_table(columns: &[ColumnSpec], records: &[Record]) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>\n");

    for column in columns {
        let _ = writeln!(html, "    <th>{}</th>", escape_html(&column.label));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in records {
        html.push_str("<tr>\n");
        for column in columns {
            let cell = normalize(record.cell(&column.key), ExportFormat::Pdf);
            let _ = writeln!(html, "    <td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 5, 0).unwrap()
    }

    fn columns(keys: &[&str]) -> Vec<ColumnSpec> {
        keys.iter().map(|k| ColumnSpec::new(*k)).collect()
    }

    #[test]
    fn test_document_structure() {
        let records = vec![Record::new().with("crop", "Wheat").with("qty", 10)];
        let html = render_document(
            "Harvest Crop Sales Income",
            "Harvest_Income_crop-sales_2024-03-05",
            &columns(&["crop", "qty"]),
            &records,
            &at(),
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Harvest Crop Sales Income</title>"));
        assert!(html.contains("<h1>Harvest Crop Sales Income</h1>"));
        assert!(html.contains("Generated on 5 March 2024, 9:05 AM"));
        assert!(html.contains("File: Harvest_Income_crop-sales_2024-03-05"));
        assert!(html.contains("<th>crop</th>"));
        assert!(html.contains("<td>Wheat</td>"));
        assert!(html.contains("<td>10</td>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_escapes_cells_and_title() {
        let records = vec![Record::new().with("note", "<script>alert('x')</script>")];
        let html = render_document(
            "A & B <report>",
            "f",
            &columns(&["note"]),
            &records,
            &at(),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("<title>A &amp; B &lt;report&gt;</title>"));
    }

    #[test]
    fn test_escapes_labels() {
        let cols = vec![ColumnSpec::new("qty").with_label("Qty \"kg\"")];
        let table = render_table(&cols, &[]);
        assert!(table.contains("<th>Qty &quot;kg&quot;</th>"));
    }

    #[test]
    fn test_dates_use_long_form() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let records = vec![Record::new().with("sown_on", date)];
        let table = render_table(&columns(&["sown_on"]), &records);
        assert!(table.contains("<td>5 March 2024</td>"));
    }

    #[test]
    fn test_header_only_table() {
        let table = render_table(&columns(&["a", "b"]), &[]);
        assert!(table.contains("<th>a</th>"));
        assert!(table.contains("<tbody>\n</tbody>"));
    }

    #[test]
    fn test_missing_cells_are_blank_and_zero_kept() {
        let records = vec![
            Record::new().with("a", 0).with("b", "x"),
            Record::new().with("a", 1),
        ];
        let table = render_table(&columns(&["a", "b"]), &records);
        assert!(table.contains("<td>0</td>"));
        assert!(table.contains("<td></td>"));
    }

    #[test]
    fn test_striping_and_print_rules_present() {
        let html = render_document("T", "f", &columns(&["a"]), &[], &at());
        assert!(html.contains("nth-child(even)"));
        assert!(html.contains("@page"));
    }
}
