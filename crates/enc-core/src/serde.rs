use std::collections::BTreeMap;
use std::iter::FromIterator;

use ::serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{EncError, ErrorInfo};

fn serde_error(code: &str, err: impl ToString) -> EncError {
    EncError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut ordered = BTreeMap::new();
            for (key, val) in map {
                ordered.insert(key, canonicalize(val));
            }
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic ordering.
///
/// Non-finite floats become `null`, as `serde_json` does.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, EncError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("enc_core.json_encode", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical)
        .map_err(|err| serde_error("enc_core.json_write", err))?;
    Ok(bytes)
}

/// Pretty variant of [`to_canonical_json_bytes`] for human facing output.
pub fn to_canonical_json_pretty<T: Serialize>(value: &T) -> Result<String, EncError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("enc_core.json_encode", err))?;
    serde_json::to_string_pretty(&canonicalize(value))
        .map_err(|err| serde_error("enc_core.json_write", err))
}

