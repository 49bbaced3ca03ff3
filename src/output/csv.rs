//! CSV export
//!
//! Columns are the sorted union of keys across all records, so records with
//! different derived fields share one header.

use crate::listing::NormalizedRecord;
use crate::output::{into_utf8, record_maps, render_value, sorted_columns, ExportError};

/// Renders records as CSV with a header row
pub fn format_csv(records: &[NormalizedRecord]) -> Result<String, ExportError> {
    let rows = record_maps(records);
    let columns = sorted_columns(&rows);

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }

    for row in &rows {
        let cells = columns
            .iter()
            .map(|column| row.get(column).map(render_value).unwrap_or_default());
        writer.write_record(cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    into_utf8(bytes)
}
