//! Project every record and order the resulting rows.

use serde_json::Value;

use super::fields::{FieldSpec, output_key, project};
use super::session::UnknownFields;
use crate::api::models::{Constants, Record, Row};

/// Column whose value orders the rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    /// The first column of each row, whatever it happens to be.
    #[default]
    FirstField,
    /// A named column; dotted names refer to their flattened output key.
    Field(String),
}

impl SortKey {
    pub fn from_option(name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => SortKey::Field(output_key(name)),
            None => SortKey::FirstField,
        }
    }
}

/// Lower-cased text of a value: string contents as-is, `null` as `none`,
/// anything else as compact JSON. `none` keeps null rows where the Python-era
/// reports placed them (after `nonce`, before `notes`).
pub fn sort_value(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

fn row_sort_value(row: &Row, key: &SortKey) -> String {
    let value = match key {
        SortKey::FirstField => row.first().map(|(_, value)| value),
        SortKey::Field(name) => row.get(name),
    };
    value.map(sort_value).unwrap_or_default()
}

/// Stable sort; rows with equal keys keep their fetch order.
pub fn sort_rows(rows: &mut [Row], key: &SortKey) {
    rows.sort_by_cached_key(|row| row_sort_value(row, key));
}

pub fn assemble(
    records: &[Record],
    spec: &FieldSpec,
    constants: &Constants,
    sort: &SortKey,
    unknown: &mut UnknownFields,
) -> Vec<Row> {
    let mut rows: Vec<Row> = records
        .iter()
        .map(|record| project(record, spec, constants, unknown))
        .collect();
    sort_rows(&mut rows, sort);
    rows
}
