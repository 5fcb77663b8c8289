//! Lenient numeric coercion for values that arrive from forms or JSON.
//!
//! Anything that is not a finite number degrades to `0.0`. No errors are raised.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse text input, treating blank, malformed, NaN and infinite values as `0.0`.
pub fn parse_lenient(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

/// Coerce an arbitrary JSON value to a number.
///
/// Numbers are taken as-is, strings are parsed, everything else is `0.0`.
pub fn coerce(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Value::String(s) => parse_lenient(s),
        _ => 0.0,
    }
}

/// `serde(deserialize_with = ...)` adapter over [`coerce`].
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(&value))
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() { n } else { 0.0 }
}
