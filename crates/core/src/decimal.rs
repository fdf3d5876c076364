//! Lenient decoding of decimal columns.
//!
//! The parameters API serializes `NUMERIC` columns either as JSON numbers or
//! as strings (`"540.00"`). These helpers accept both and map anything that
//! is not a finite number to `None`, so callers can apply their own default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a finite `f64`.
///
/// Strings are trimmed and may use a decimal comma (`"12,5"`).
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a user- or API-provided decimal string.
///
/// Accepts surrounding whitespace and a single decimal comma. Returns `None`
/// for empty or malformed input.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// `deserialize_with` adapter for optional decimal fields.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// `deserialize_with` adapter for optional integer fields.
///
/// Fractional values are truncated toward zero.
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|v| *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
        .map(|v| v.trunc() as i32))
}
