//! Field projection: shaping one raw record into an output row.

use serde_json::Value;

use super::entity::EntityType;
use super::session::UnknownFields;
use crate::api::models::{Constants, Record, Row};

/// Which fields of a record to keep, decided once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Every key (`*`).
    All,
    /// Only keys ending in `url` (`urls`).
    Urls,
    /// Every key not ending in `url`, nested objects cleaned too (`nourls`).
    NonUrls,
    /// Named fields in request order; dotted names reach into nested objects.
    Explicit(Vec<String>),
}

impl FieldSpec {
    /// Build from a list of names; an empty list means the entity's defaults.
    pub fn from_names<S: AsRef<str>>(names: &[S], entity: EntityType) -> Self {
        let names: Vec<String> = names
            .iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        match names.first().map(String::as_str) {
            None => FieldSpec::Explicit(
                entity
                    .default_fields()
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            ),
            Some("*") => FieldSpec::All,
            Some("urls") => FieldSpec::Urls,
            Some("nourls") => FieldSpec::NonUrls,
            Some(_) => FieldSpec::Explicit(names),
        }
    }

    /// Parse the slash-separated form used on the command line (`login/id/type`).
    pub fn parse(spec: Option<&str>, entity: EntityType) -> Self {
        let names: Vec<&str> = spec.map(|s| s.split('/').collect()).unwrap_or_default();
        Self::from_names(&names, entity)
    }
}

/// `license.name` becomes `license_name` in output rows.
pub fn output_key(name: &str) -> String {
    name.replace('.', "_")
}

pub fn is_url_field(name: &str) -> bool {
    name.ends_with("url")
}

/// Follow a dotted path through nested objects. Any missing key or
/// non-object along the way yields `None`.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn strip_url_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !is_url_field(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Apply `spec` to one record.
///
/// Constants are merged first for `All`/`NonUrls` and take precedence over
/// record values in `Explicit` mode. Explicit names missing from the record
/// come out as `null` and are noted in `unknown`.
pub fn project(
    record: &Record,
    spec: &FieldSpec,
    constants: &Constants,
    unknown: &mut UnknownFields,
) -> Row {
    let mut row = Row::new();

    match spec {
        FieldSpec::All | FieldSpec::NonUrls => {
            let strip = matches!(spec, FieldSpec::NonUrls);
            row.extend(constants.iter().map(|(k, v)| (k.clone(), v.clone())));
            for (key, value) in record {
                if strip && is_url_field(key) {
                    continue;
                }
                let value = if strip {
                    strip_url_fields(value)
                } else {
                    value.clone()
                };
                row.insert(key.clone(), value);
            }
        }
        FieldSpec::Urls => {
            for (key, value) in record.iter().filter(|(key, _)| is_url_field(key)) {
                row.insert(key.clone(), value.clone());
            }
        }
        FieldSpec::Explicit(names) => {
            for name in names {
                if let Some(value) = constants.get(name) {
                    row.insert(name.clone(), value.clone());
                } else if name.contains('.') {
                    let value = lookup(record, name).cloned().unwrap_or(Value::Null);
                    row.insert(output_key(name), value);
                } else if let Some(value) = record.get(name) {
                    let value = if name.eq_ignore_ascii_case("private") {
                        let label = if is_truthy(value) { "private" } else { "public" };
                        Value::String(label.to_string())
                    } else {
                        value.clone()
                    };
                    row.insert(name.clone(), value);
                } else {
                    unknown.insert(name);
                    row.insert(name.clone(), Value::Null);
                }
            }
        }
    }

    row
}
