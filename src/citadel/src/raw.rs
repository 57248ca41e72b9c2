//! Null-safe access into decompiled records
//!
//! Raw records are nested JSON objects keyed by engine field names. They are
//! never mutated; parsers read through these helpers and build new records.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::numbers::coerce_f64;
use crate::parsers::ParseError;

/// One decompiled file: record key → record
pub type RawRecords = BTreeMap<String, Value>;

/// Follow a path of object keys, returning `None` on any missing step or
/// non-object intermediate.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    match current {
        Value::Null => None,
        v => Some(v),
    }
}

/// Read an object at a path
pub fn get_object<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    get_path(value, path).and_then(Value::as_object)
}

/// Read a string at a path
pub fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    get_path(value, path).and_then(Value::as_str)
}

/// Read a sanitized number at a path.
///
/// Missing fields are `Ok(None)`. Numeric strings are coerced. Non-finite
/// values and anything that is not a number are errors.
pub fn get_number(value: &Value, path: &[&str]) -> Result<Option<f64>, ParseError> {
    let Some(v) = get_path(value, path) else {
        return Ok(None);
    };
    sanitize_number(v, &path.join(".")).map(Some)
}

/// Like [`get_number`] but a missing field is an error
pub fn require_number(value: &Value, path: &[&str]) -> Result<f64, ParseError> {
    get_number(value, path)?.ok_or_else(|| ParseError::MissingField(path.join(".")))
}

/// Validate a single raw numeric value
pub fn sanitize_number(value: &Value, field: &str) -> Result<f64, ParseError> {
    let n = coerce_f64(value).ok_or_else(|| ParseError::UnexpectedType {
        field: field.to_string(),
        expected: "number",
        found: value.to_string(),
    })?;
    if !n.is_finite() {
        return Err(ParseError::NonFiniteNumber {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(n)
}

/// Read a tri-state engine flag: JSON boolean, `"true"` or `"false"`.
///
/// A missing flag is `false`. Any other representation is a data-shape error.
pub fn get_flag(value: &Value, path: &[&str]) -> Result<bool, ParseError> {
    match get_path(value, path) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s == "true" => Ok(true),
        Some(Value::String(s)) if s == "false" => Ok(false),
        Some(other) => Err(ParseError::InvalidFlag {
            field: path.join("."),
            value: other.to_string(),
        }),
    }
}
