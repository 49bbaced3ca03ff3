use crate::listing::NormalizedRecord;
use crate::output::{record_maps, render_value, sorted_columns};
use quick_xml::escape::escape;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; width: 100%; font-size: 0.9em; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; vertical-align: top; }
th { background: #f0f0f0; position: sticky; top: 0; }
tr:nth-child(even) { background: #fafafa; }";

/// Renders records as a standalone HTML page with one table
///
/// Columns are the sorted union of record keys; every cell is escaped.
pub fn format_html(records: &[NormalizedRecord]) -> String {
    let rows = record_maps(records);
    let columns = sorted_columns(&rows);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Autoscout24 listings</title>\n");
    html.push_str(&format!("<style>\n{}\n</style>\n", STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>Autoscout24 listings ({})</h1>\n", rows.len()));
    html.push_str("<table>\n<thead>\n<tr>");

    for column in &columns {
        html.push_str(&format!("<th>{}</th>", escape(column.as_str())));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &rows {
        html.push_str("<tr>");
        for column in &columns {
            let cell = row.get(column).map(render_value).unwrap_or_default();
            html.push_str(&format!("<td>{}</td>", escape(cell.as_str())));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_records;

    #[test]
    fn test_html_table() {
        let rendered = format_html(&sample_records());

        assert!(rendered.starts_with("<!DOCTYPE html>"));
        assert!(rendered.contains("<style>"));
        assert!(rendered.contains("<th>bodyType</th>"));
        assert_eq!(rendered.matches("<tr>").count(), 3);
        assert!(rendered.contains("<td>BMW X5 &lt;xDrive40d&gt;</td>"));
        assert!(rendered.contains("<td>Autohaus Nord &amp; Co</td>"));
    }

    #[test]
    fn test_html_empty() {
        let rendered = format_html(&[]);
        assert!(rendered.contains("(0)"));
        assert!(!rendered.contains("<td>"));
    }
}
