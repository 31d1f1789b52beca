//! Loose coercions shared by the field kinds
//!
//! Raw records come from loosely typed storage, so scalar kinds accept
//! anything that reads as their type rather than demanding exact JSON types.

use serde_json::{Number, Value};

/// Returns whether `value` counts as "set" in a boolean context.
///
/// Null, false, zero, `""` and `"0"` are false; so is an empty array.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Parses a numeric string, allowing surrounding whitespace, a sign, a
/// fraction and an exponent. Words such as `inf` or `NaN` are rejected.
pub(crate) fn parse_numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty()
        || !t.bytes().any(|b| b.is_ascii_digit())
        || !t
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Returns the numeric reading of `value`, if it has one.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Returns the integer reading of a numeric `value`, truncating toward zero.
///
/// Unsigned values above `i64::MAX` pass through unchanged. Fractional
/// values whose integer part does not fit an `i64` have no reading.
pub(crate) fn integer(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Number::from)
            .or_else(|| n.as_u64().map(Number::from))
            .or_else(|| n.as_f64().and_then(truncated)),
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| t.parse::<u64>().ok().map(Number::from))
                .or_else(|| parse_numeric(t).and_then(truncated))
        }
        _ => None,
    }
}

fn truncated(f: f64) -> Option<Number> {
    let whole = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (whole >= i64::MIN as f64 && whole < i64::MAX as f64).then(|| Number::from(whole as i64))
}

/// Renders a scalar as text. Non-scalars have no text form.
pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Wraps a float, mapping non-finite values to null.
pub(crate) fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}
