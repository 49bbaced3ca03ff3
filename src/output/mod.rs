//! Output module for exporting scraped listings
//!
//! This module handles:
//! - Rendering records as JSON, CSV, XML, RSS or HTML
//! - Writing the rendered export to disk
//! - A last-resort JSON dump when the export cannot be written
//! - Recording crawl statistics

mod csv;
mod html;
mod json;
pub mod stats;
mod xml;

pub use self::csv::format_csv;
pub use html::format_html;
pub use json::format_json;
pub use stats::{print_statistics, CrawlStatistics};
pub use xml::{format_rss, format_xml};

use crate::listing::NormalizedRecord;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while exporting records
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Serialization format of the export file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Xml,
    Rss,
    Html,
}

impl OutputFormat {
    /// File extension used for the default output path
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
            OutputFormat::Rss => "rss",
            OutputFormat::Html => "html",
        }
    }

    /// Guesses the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;
        match extension.to_lowercase().as_str() {
            "htm" => Ok(OutputFormat::Html),
            other => other.parse(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            "rss" => Ok(OutputFormat::Rss),
            "html" => Ok(OutputFormat::Html),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Renders records in the given format
pub fn render(records: &[NormalizedRecord], format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Json => format_json(records),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Xml => format_xml(records),
        OutputFormat::Rss => format_rss(records),
        OutputFormat::Html => Ok(format_html(records)),
    }
}

/// Writes records to `path`, creating parent directories as needed
///
/// # Returns
///
/// * `Ok(())` - Export written
/// * `Err(ExportError)` - Rendering or writing failed
pub fn export_records(
    records: &[NormalizedRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExportError> {
    let rendered = render(records, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Dumps records as JSON to a timestamped file in the system temp dir
///
/// Used when the requested export fails, so a finished scrape is not lost.
pub fn write_fallback_dump(records: &[NormalizedRecord]) -> Result<PathBuf, ExportError> {
    write_fallback_dump_in(&std::env::temp_dir(), records)
}

fn write_fallback_dump_in(dir: &Path, records: &[NormalizedRecord]) -> Result<PathBuf, ExportError> {
    let file_name = format!(
        "autoscout-scraper-{}.json",
        Utc::now().format("%Y%m%dT%H%M%S%.3f")
    );
    let path = dir.join(file_name);
    export_records(records, &path, OutputFormat::Json)?;
    Ok(path)
}

/// Records as JSON objects, in input order
fn record_maps(records: &[NormalizedRecord]) -> Vec<Map<String, Value>> {
    records.iter().map(NormalizedRecord::to_json_map).collect()
}

/// Sorted union of the keys of every record
fn sorted_columns(rows: &[Map<String, Value>]) -> Vec<String> {
    let columns: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
    columns.into_iter().cloned().collect()
}

fn into_utf8(bytes: Vec<u8>) -> Result<String, ExportError> {
    String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Flattens a value into a single cell
///
/// `null` becomes empty and lists are joined with `"; "`.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
