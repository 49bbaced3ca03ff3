use crate::listing::NormalizedRecord;
use crate::output::ExportError;

/// Renders records as a pretty-printed JSON array
///
/// Absent text fields are `null`; absent derived fields are omitted.
pub fn format_json(records: &[NormalizedRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(records)?)
}
