//! Input validation for command-line arguments and configuration values.

use crate::error::{CliError, ExportError};
use std::path::Path;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Output files must end in `.csv` or `.json` (any case).
pub fn validate_output_filename(filename: &str) -> crate::Result<()> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") | Some("json") => Ok(()),
        _ => Err(ExportError::UnsupportedFormat {
            filename: filename.to_string(),
        }
        .into()),
    }
}

/// Organization, user and repository names as GitHub accepts them.
pub fn validate_name(kind: &str, name: &str) -> crate::Result<()> {
    if name.trim().is_empty() {
        return Err(CliError::InvalidArguments(format!("{} cannot be empty", kind)).into());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(CliError::InvalidArguments(format!(
            "Invalid {} '{}': only letters, digits, '-', '_' and '.' are allowed",
            kind, name
        ))
        .into());
    }

    Ok(())
}
