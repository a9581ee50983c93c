use csv::Writer;
use std::fs;
use std::path::Path;

use crate::api::models::Row;
use crate::error::ExportError;
use crate::utils::text::value_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(OutputFormat::Csv),
            Some("json") => Ok(OutputFormat::Json),
            _ => Err(ExportError::UnsupportedFormat {
                filename: path.display().to_string(),
            }),
        }
    }
}

/// Write rows to `path`, format chosen by extension. Existing files are replaced.
pub fn write_rows(rows: &[Row], path: &Path) -> Result<OutputFormat, ExportError> {
    let format = OutputFormat::from_path(path)?;
    match format {
        OutputFormat::Csv => write_csv(rows, path)?,
        OutputFormat::Json => write_json(rows, path)?,
    }
    Ok(format)
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> ExportError {
    ExportError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Header is the first row's keys; every row is written against that header.
fn write_csv(rows: &[Row], path: &Path) -> Result<(), ExportError> {
    let mut writer = Writer::from_path(path).map_err(|e| write_error(path, e))?;

    if let Some(first) = rows.first() {
        let columns: Vec<&String> = first.keys().collect();
        writer
            .write_record(columns.iter().map(|c| c.as_str()))
            .map_err(|e| write_error(path, e))?;

        for row in rows {
            let record: Vec<String> = columns
                .iter()
                .map(|column| row.get(*column).map(value_text).unwrap_or_default())
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| write_error(path, e))?;
        }
    }

    writer.flush().map_err(|e| write_error(path, e))
}

fn write_json(rows: &[Row], path: &Path) -> Result<(), ExportError> {
    let content = serde_json::to_string_pretty(rows).map_err(|e| write_error(path, e))?;
    fs::write(path, content).map_err(|e| write_error(path, e))
}
