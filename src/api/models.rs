use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use serde_json::Value;

use super::links::PageLinks;
use crate::error::ApiError;

/// One raw JSON object as returned by the API, native key order preserved.
pub type Record = serde_json::Map<String, Value>;

/// A projected output row: field name to value, in request order.
pub type Row = IndexMap<String, Value>;

/// Fixed key/value pairs attached to every record of a query.
pub type Constants = IndexMap<String, Value>;

/// Raw result of a single transport call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub endpoint: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn links(&self) -> PageLinks {
        PageLinks::from_headers(&self.headers)
    }

    pub fn byte_len(&self) -> usize {
        self.body.len()
    }

    /// Decode the body into records.
    ///
    /// An array contributes its object elements (anything else is skipped),
    /// a single object contributes itself and an empty body contributes nothing.
    pub fn records(&self) -> Result<Vec<Record>, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&self.body).map_err(|e| ApiError::Decode {
            endpoint: self.endpoint.clone(),
            message: e.to_string(),
        })?;

        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect()),
            Value::Object(record) => Ok(vec![record]),
            other => Err(ApiError::Decode {
                endpoint: self.endpoint.clone(),
                message: format!("expected a JSON array or object, got {}", kind(&other)),
            }),
        }
    }

    /// The `message` field GitHub puts in error bodies, if any.
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }

    pub fn into_error(self) -> ApiError {
        let message = self
            .error_message()
            .unwrap_or_else(|| "no error message in response".to_string());
        ApiError::Http {
            status: self.status,
            endpoint: self.endpoint,
            message,
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
