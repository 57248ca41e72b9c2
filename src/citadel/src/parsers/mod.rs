//! Entity parsers
//!
//! Each parser reads raw decompiled records through [`crate::raw`] and builds
//! finalized [`crate::Entity`] records. Raw input is never mutated.

pub mod ability;
pub mod description;
pub mod hero;
pub mod item;
pub mod npc;

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::localization::REFERENCE_LANGUAGE;
use crate::numbers::{is_numeric, number_value};
use crate::raw::sanitize_number;

pub use description::{DescriptionError, DescriptionFormatter};

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field {field}: expected {expected}, found {found}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("Field {field} is not a finite number: {value}")]
    NonFiniteNumber { field: String, value: String },

    #[error("Field {field} is not a boolean flag: {value}")]
    InvalidFlag { field: String, value: String },

    #[error("Scaling basis mismatch for {stat}: expected {expected}, found {found}")]
    ScalingBasisMismatch {
        stat: String,
        expected: String,
        found: String,
    },

    #[error("No price for item tier {tier}")]
    MissingPriceTier { tier: String },

    #[error("Upgrade tier {tier} scales both {first} and {second}")]
    DuplicateScaleUpgrade {
        tier: usize,
        first: String,
        second: String,
    },

    #[error("Cannot split melee scaling: light melee damage is {light}")]
    InvalidMeleeRatio { light: f64 },
}

/// How the NPC parser reacts to a broken archetype record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Abort the run on the first error
    #[default]
    Strict,
    /// Log the failure and skip the record
    Lenient,
}

/// Per-run parser configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Language names and descriptions are resolved in
    pub reference_language: String,
    /// Languages loaded and written to `localizations/`; empty means all found
    pub languages: Vec<String>,
    pub npc_mode: ParseMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            reference_language: REFERENCE_LANGUAGE.to_string(),
            languages: Vec::new(),
            npc_mode: ParseMode::Strict,
        }
    }
}

impl ParseOptions {
    /// Returns true if the language should be loaded
    pub fn wants_language(&self, language: &str) -> bool {
        self.languages.is_empty()
            || language == self.reference_language
            || self.languages.iter().any(|l| l == language)
    }
}

/// Flatten an `m_mapAbilityProperties` map into attribute → value.
///
/// Numeric values become numbers, other strings are kept as-is. Zeros are
/// kept so descriptions can still refer to them; use [`applies`] to leave
/// them out of emitted records.
pub(crate) fn flatten_properties(
    properties: Option<&Map<String, Value>>,
) -> Result<BTreeMap<String, Value>, ParseError> {
    let mut out = BTreeMap::new();
    let Some(properties) = properties else {
        return Ok(out);
    };

    for (name, property) in properties {
        let Some(raw) = property.get("m_strValue") else {
            continue;
        };
        let value = match raw {
            Value::String(s) if is_numeric(s) => number_value(sanitize_number(raw, name)?),
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => Value::String(s.clone()),
            other => number_value(sanitize_number(other, name)?),
        };
        out.insert(name.clone(), value);
    }
    Ok(out)
}

/// A property value of zero means the property does not apply
pub(crate) fn applies(value: &Value) -> bool {
    value.as_f64() != Some(0.0)
}

/// Render an attribute value for substitution into display text
pub(crate) fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
