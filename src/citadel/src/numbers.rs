//! Numeric cleanup shared by the parsers
//!
//! Source data stores most numbers as 32-bit floats, so values like `12.6`
//! arrive as `12.5999997`. Everything that ends up in an output record passes
//! through [`fix_float_garbage`] or [`round_sig`].

use serde_json::Value;

/// Default number of decimals tried by [`clean`]
pub const MAX_DECIMALS: u32 = 3;

/// Default tolerance used by [`clean`]
pub const EPSILON: f64 = 1e-5;

/// Remove binary floating point noise from a value.
///
/// Rounds to 0..=`max_decimals` decimal places and returns the first rounding
/// that lands within `eps` of the original. Values with genuine precision
/// beyond `max_decimals` are returned untouched.
///
/// `12.5999997` → `12.6`, `12.567` → `12.567`
pub fn fix_float_garbage(value: f64, max_decimals: u32, eps: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    for decimals in 0..=max_decimals {
        let rounded = round_decimals(value, decimals);
        if (rounded - value).abs() < eps {
            return rounded;
        }
    }
    value
}

/// [`fix_float_garbage`] with the default precision
pub fn clean(value: f64) -> f64 {
    fix_float_garbage(value, MAX_DECIMALS, EPSILON)
}

/// Round to a fixed number of decimal places.
///
/// Goes through the decimal formatter so the result is the closest `f64` to the
/// decimal string, not an accumulation of multiply/divide error.
pub fn round_decimals(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Round to `sigfigs` significant figures.
///
/// `0` and non-finite values pass through unchanged.
pub fn round_sig(value: f64, sigfigs: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || sigfigs == 0 {
        return value;
    }
    format!("{:.*e}", (sigfigs - 1) as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Convert a number into a JSON value, emitting integral values as integers.
pub fn number_value(value: f64) -> Value {
    let value = clean(value);
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Coerce a raw JSON value into a number.
///
/// Numbers pass through; strings are parsed (surrounding whitespace ignored).
/// Returns `None` for anything else, including unparseable strings.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Returns true if the string is a plain number ("12", "-0.5", "1e3")
pub fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite)
}
