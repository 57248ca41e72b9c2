//! Attribute normalization
//!
//! Raw records use engine naming: Hungarian-style field prefixes (`m_fl`,
//! `m_i`, `m_b`), enum-style stat keys (`EMaxMoveSpeed`) and enum literals as
//! values (`EAbilityType_Signature`). This module turns those into the
//! human-readable names used by the output records.

pub mod enums;
mod order;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::numbers::round_sig;

pub use enums::EnumTable;
pub use order::AttributeOrder;

/// Engine distance units (inches) per meter
pub const ENGINE_UNITS_PER_METER: f64 = 1.0 / 0.0254;

/// Significant figures kept after a unit conversion
pub const DEFAULT_SIGFIGS: u32 = 4;

/// Field-name prefixes, most specific first
pub const FIELD_PREFIXES: &[&str] = &[
    "m_str", "m_vec", "m_map", "m_fl", "m_n", "m_i", "m_b", "m_e", "m_s", "m_", "fl", "e",
];

/// Prefix on stat enum keys (`EMaxMoveSpeed`)
pub const STAT_PREFIXES: &[&str] = &["E"];

#[derive(Error, Debug, PartialEq)]
pub enum AttributeError {
    #[error("Unknown {table} value: {value}")]
    UnknownEnumValue { table: &'static str, value: String },
}

/// Strip the first matching prefix from a key.
///
/// A prefix only matches if what follows it starts with an uppercase letter,
/// so `m_bloodCost` is not cut down to `loodCost`. Keys with no matching
/// prefix are returned unchanged.
///
/// `"m_flBulletDamage"` → `"BulletDamage"`, `"EMaxMoveSpeed"` → `"MaxMoveSpeed"`
pub fn strip_prefix<'a>(key: &'a str, prefixes: &[&str]) -> &'a str {
    for prefix in prefixes {
        if let Some(rest) = key.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(char::is_uppercase) {
                return rest;
            }
        }
    }
    key
}

/// Apply [`strip_prefix`] to every key of every nested object, including
/// objects inside arrays.
pub fn strip_prefixes_deep(value: &Value, prefixes: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    (
                        strip_prefix(k, prefixes).to_string(),
                        strip_prefixes_deep(v, prefixes),
                    )
                })
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| strip_prefixes_deep(v, prefixes))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Map an engine enum literal to its label.
///
/// Tables are exhaustive: a literal the table does not know is an error, never
/// a guess.
pub fn map_enum(value: &str, table: &EnumTable) -> Result<&'static str, AttributeError> {
    table
        .get(value)
        .ok_or_else(|| AttributeError::UnknownEnumValue {
            table: table.name,
            value: value.to_string(),
        })
}

/// Convert engine units to meters, rounded to [`DEFAULT_SIGFIGS`].
///
/// `None` and `0` pass through unchanged.
pub fn units_to_meters(units: Option<f64>) -> Option<f64> {
    units_to_meters_with(units, DEFAULT_SIGFIGS)
}

/// [`units_to_meters`] with an explicit number of significant figures
pub fn units_to_meters_with(units: Option<f64>, sigfigs: u32) -> Option<f64> {
    match units {
        Some(u) if u != 0.0 => Some(round_sig(u / ENGINE_UNITS_PER_METER, sigfigs)),
        other => other,
    }
}
