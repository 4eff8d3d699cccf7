//! Client and service-line records.
//!
//! Source files come from different exports, so every logical field is
//! looked up through an ordered list of accepted spellings; the first
//! non-empty value wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::io::{Table, TableError, TableStore};

/// One client or service-line record: field name → value.
pub type Record = Map<String, Value>;

/// Client display name.
pub const CLIENT_NAME_FIELDS: &[&str] = &["ClientName", "client_name", "Name"];
/// Client identifier.
pub const CLIENT_ID_FIELDS: &[&str] = &["ClientID", "client_id", "Id", "ID"];
/// Fiscal year.
pub const FISCAL_YEAR_FIELDS: &[&str] = &["FiscalYear", "fiscal_year", "FY"];
/// Service-line assignments on a client record.
pub const SERVICE_ASSIGNMENT_FIELDS: &[&str] = &[
    "service_line_codes",
    "ServiceLineCodes",
    "ServiceLines",
    "services",
    "ServiceAssignments",
];
/// Keys holding code lists inside a nested assignment object.
pub const NESTED_CODE_KEYS: &[&str] = &["codes", "items", "service_lines"];
/// Code inside an assignment object.
pub const ASSIGNMENT_CODE_FIELDS: &[&str] = &["code", "Code", "ServiceLineCode"];
/// Code on a service-line reference row.
pub const SERVICE_CODE_FIELDS: &[&str] = &["ServiceLineCode", "Code", "ServiceLine", "ServiceCode"];
/// Billing rate on a service-line reference row.
pub const RATE_FIELDS: &[&str] = &["Rate", "BillingRate", "StandardRate", "HourlyRate"];
/// Description on a service-line reference row.
pub const DESCRIPTION_FIELDS: &[&str] = &["Description", "ServiceLineDescription", "Name", "Service"];

/// Errors raised while loading records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A tabular source could not be read.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A JSON source could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Source file.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON source is malformed.
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        /// Source file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A JSON source has an unexpected shape.
    #[error("{0}")]
    Shape(String),
}

impl RecordError {
    /// True when the source file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Table(e) => e.is_not_found(),
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn read_json(path: &Path) -> Result<Value, RecordError> {
    let content = std::fs::read(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| RecordError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn into_records(items: Vec<Value>, what: &str) -> Result<Vec<Record>, RecordError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(RecordError::Shape(format!(
                "{what} entry {index} is not an object: {other}"
            ))),
        })
        .collect()
}

fn table_records(table: &Table) -> Vec<Record> {
    table
        .records()
        .map(|record| {
            record
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect()
        })
        .collect()
}

/// Loads client metadata.
///
/// JSON files may hold an array of clients, an object with a `clients`
/// array, or a single client object. Any other file is read as a table.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or malformed.
pub fn load_client_metadata(path: &Path, store: &TableStore) -> Result<Vec<Record>, RecordError> {
    if !is_json(path) {
        return Ok(table_records(&store.read(path)?));
    }
    match read_json(path)? {
        Value::Array(items) => into_records(items, "client"),
        Value::Object(mut object) => match object.remove("clients") {
            Some(Value::Array(items)) => into_records(items, "client"),
            Some(other) => {
                object.insert("clients".to_string(), other);
                Ok(vec![object])
            }
            None => Ok(vec![object]),
        },
        _ => Err(RecordError::Shape(
            "Client metadata JSON must be a list or contain a 'clients' array".to_string(),
        )),
    }
}

/// Loads the service-line reference table.
///
/// JSON files may hold an array or an object with a `service_lines` array.
/// Any other file is read as a table.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or malformed.
pub fn load_service_lines(path: &Path, store: &TableStore) -> Result<Vec<Record>, RecordError> {
    if !is_json(path) {
        return Ok(table_records(&store.read(path)?));
    }
    match read_json(path)? {
        Value::Array(items) => into_records(items, "service line"),
        Value::Object(mut object) => match object.remove("service_lines") {
            Some(Value::Array(items)) => into_records(items, "service line"),
            _ => Err(RecordError::Shape(
                "Service line JSON must be a list or contain 'service_lines'.".to_string(),
            )),
        },
        _ => Err(RecordError::Shape(
            "Service line JSON must be a list or contain 'service_lines'.".to_string(),
        )),
    }
}

/// Null, empty strings and empty arrays count as absent.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Display text of a value; strings are not quoted.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First non-blank value among `keys`.
#[must_use]
pub fn extract_field<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !is_blank(value))
}

/// First non-blank value among `keys`, as text.
#[must_use]
pub fn extract_text(record: &Record, keys: &[&str]) -> Option<String> {
    extract_field(record, keys).map(value_text)
}

fn collect_codes(value: &Value, codes: &mut Vec<String>) {
    match value {
        Value::String(text) => codes.extend(
            text.split([';', ','])
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string),
        ),
        Value::Object(object) => {
            let nested = NESTED_CODE_KEYS
                .iter()
                .filter_map(|key| object.get(*key))
                .find(|v| is_truthy(v));
            if let Some(Value::Array(items)) = nested {
                for item in items {
                    collect_codes(item, codes);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let code = match item {
                    Value::Object(object) => extract_text(object, ASSIGNMENT_CODE_FIELDS),
                    other => Some(value_text(other)),
                };
                if let Some(code) = code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
                    codes.push(code);
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}

/// Service-line codes assigned to a client, upper-cased and de-duplicated
/// in first-seen order.
///
/// Accepts a `;`/`,` delimited string, a list of codes, a list of
/// `{code: ..}` objects, or an object nesting one of those under `codes`,
/// `items` or `service_lines`.
#[must_use]
pub fn extract_service_codes(record: &Record) -> Vec<String> {
    let mut codes = Vec::new();
    if let Some(value) = extract_field(record, SERVICE_ASSIGNMENT_FIELDS) {
        collect_codes(value, &mut codes);
    }

    let mut ordered: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let upper = code.to_uppercase();
        if !upper.is_empty() && !ordered.contains(&upper) {
            ordered.push(upper);
        }
    }
    ordered
}

/// Indexes service-line rows by upper-cased code; later rows win.
#[must_use]
pub fn index_service_lines(rows: Vec<Record>) -> BTreeMap<String, Record> {
    rows.into_iter()
        .filter_map(|row| {
            let code = extract_text(&row, SERVICE_CODE_FIELDS)?;
            let code = code.trim().to_uppercase();
            (!code.is_empty()).then_some((code, row))
        })
        .collect()
}
