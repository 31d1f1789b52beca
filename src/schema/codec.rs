//! Per-kind decode (raw → typed) and encode (typed → raw)
//!
//! Decoding never fails on merely malformed input: such values come out as
//! null and are left for validation to report. The only hard failures are
//! enum values that cannot be mapped in either direction.

use std::net::IpAddr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Number, Value};

use super::coerce::{float_value, integer, numeric, text, truthy};
use super::decimal;
use super::errors::{SchemaError, SchemaResult};
use super::line::Line;
use super::types::{FieldDescriptor, FieldKind};

/// Decodes the raw value of `field`. `raw` is `None` when the record has no
/// entry for the field.
pub(crate) fn decode(
    field: &FieldDescriptor,
    schema_name: &str,
    raw: Option<&Value>,
) -> SchemaResult<Value> {
    let raw = raw.filter(|v| !v.is_null());

    let value = match field.kind() {
        FieldKind::Boolean => raw.map_or(Value::Null, |v| Value::Bool(truthy(v))),
        FieldKind::String | FieldKind::Date | FieldKind::Time | FieldKind::DateTime => {
            text_value(raw)
        }
        FieldKind::Integer | FieldKind::Port => match raw {
            Some(Value::Bool(b)) => Value::from(i64::from(*b)),
            Some(v) => integer(v).map_or(Value::Null, Value::Number),
            None => Value::Null,
        },
        FieldKind::Decimal { dp } => raw
            .and_then(|v| scale(v, *dp))
            .and_then(|s| decimal_number(&s))
            .map_or(Value::Null, Value::Number),
        FieldKind::Latitude | FieldKind::Longitude => {
            raw.and_then(numeric).map_or(Value::Null, float_value)
        }
        FieldKind::Enum { allowed } => {
            let label = raw.and_then(enum_index).and_then(|i| allowed.get(i));
            match label {
                Some(label) => Value::String(label.clone()),
                None => {
                    let shown = raw.and_then(text).unwrap_or_default();
                    return Err(SchemaError::enum_decode(
                        schema_name,
                        field.name(),
                        shown,
                        allowed,
                    ));
                }
            }
        }
        FieldKind::EnumMulti { allowed } => {
            let mask = raw.map_or(0, bitmask);
            Value::String(labels_for_mask(mask, allowed))
        }
        FieldKind::Hex => raw
            .filter(|v| truthy(v))
            .and_then(Value::as_str)
            .and_then(|s| STANDARD.decode(s.trim()).ok())
            .map_or(Value::Null, |bytes| Value::String(hex::encode(bytes))),
        FieldKind::IpAddress { .. } => raw.and_then(canonical_ip).map_or(Value::Null, Value::String),
        FieldKind::Literal { value } => value.to_value(),
    };

    Ok(value)
}

/// Encodes the line value of `field` for storage.
///
/// `prior` is the previously stored state of the line; no built-in kind
/// needs it.
pub(crate) fn encode(
    field: &FieldDescriptor,
    schema_name: &str,
    line: &Line,
    _prior: Option<&Line>,
) -> SchemaResult<Value> {
    let current = line.value(field.name());

    let value = match field.kind() {
        FieldKind::Boolean => Value::Bool(current.map_or(false, truthy)),
        FieldKind::String | FieldKind::Date | FieldKind::Time | FieldKind::DateTime => {
            text_value(current)
        }
        FieldKind::Integer | FieldKind::Port => {
            current.and_then(integer).map_or(Value::Null, Value::Number)
        }
        FieldKind::Decimal { dp } => current
            .and_then(|v| scale(v, *dp))
            .map_or(Value::Null, Value::String),
        FieldKind::Latitude => current
            .and_then(numeric)
            .map_or(Value::Null, |f| float_value(f.clamp(-90.0, 90.0))),
        FieldKind::Longitude => current
            .and_then(numeric)
            .map_or(Value::Null, |f| float_value(wrap_longitude(f))),
        FieldKind::Enum { allowed } => {
            let label = current.and_then(text);
            match label
                .as_deref()
                .and_then(|l| allowed.iter().position(|a| a == l))
            {
                Some(index) => Value::from(index as u64),
                None => {
                    return Err(SchemaError::enum_encode(
                        schema_name,
                        field.name(),
                        label.unwrap_or_default(),
                        allowed,
                    ));
                }
            }
        }
        FieldKind::EnumMulti { allowed } => {
            let selected = current
                .filter(|v| truthy(v))
                .and_then(text)
                .unwrap_or_default();
            Value::from(mask_for_labels(&selected, allowed))
        }
        FieldKind::Hex => current
            .and_then(text)
            .and_then(|s| hex::decode(s).ok())
            .map_or(Value::Null, |bytes| Value::String(STANDARD.encode(bytes))),
        FieldKind::IpAddress { .. } => current
            .and_then(canonical_ip)
            .map_or(Value::Null, Value::String),
        // Literals are filtered out before reaching the codec.
        FieldKind::Literal { .. } => Value::Null,
    };

    Ok(value)
}

fn text_value(value: Option<&Value>) -> Value {
    value.and_then(text).map_or(Value::Null, Value::String)
}

/// Scales a decimal (string or number) to `dp` fractional digits.
fn scale(value: &Value, dp: u32) -> Option<String> {
    match value {
        Value::String(s) => decimal::truncate(s.trim(), dp),
        Value::Number(n) => decimal::truncate(&n.to_string(), dp),
        _ => None,
    }
}

/// Builds a JSON number from exact scaled digits, without passing through
/// `f64`. Trailing fractional zeros are dropped down to one digit, so the
/// number reads as a float: `"12.30"` becomes `12.3`, `"150"` becomes `150.0`.
fn decimal_number(scaled: &str) -> Option<Number> {
    let rendered = match scaled.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            format!("{}.{}", whole, if frac.is_empty() { "0" } else { frac })
        }
        None => format!("{}.0", scaled),
    };
    rendered.parse::<Number>().ok()
}

fn enum_index(raw: &Value) -> Option<usize> {
    match raw {
        Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn bitmask(raw: &Value) -> u64 {
    match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

/// Joins the labels whose bits are set in `mask`, in `allowed` order.
pub(crate) fn labels_for_mask(mask: u64, allowed: &[String]) -> String {
    allowed
        .iter()
        .enumerate()
        .filter(|(i, _)| *i < 64 && mask & (1u64 << i) != 0)
        .map(|(_, label)| label.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// ORs together the bits of every allowed label in the comma-joined
/// `selected`. Unrecognized labels are dropped.
pub(crate) fn mask_for_labels(selected: &str, allowed: &[String]) -> u64 {
    if selected.is_empty() {
        return 0;
    }
    let parts: Vec<&str> = selected.split(',').collect();
    allowed
        .iter()
        .enumerate()
        .filter(|(i, label)| *i < 64 && parts.contains(&label.as_str()))
        .fold(0, |mask, (i, _)| mask | (1u64 << i))
}

/// Normalizes a multi-enum default to the comma-joined form a decode would
/// produce. A packed integer is accepted as well.
pub(crate) fn canonical_selection(value: &Value, allowed: &[String]) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Number(_) => Value::String(labels_for_mask(bitmask(value), allowed)),
        other => {
            let selected = text(other).unwrap_or_default();
            Value::String(labels_for_mask(mask_for_labels(&selected, allowed), allowed))
        }
    }
}

/// Round-trips an address through its binary form.
pub(crate) fn canonical_ip(value: &Value) -> Option<String> {
    let s = text(value)?;
    if s.is_empty() {
        return None;
    }
    s.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

/// Wraps a longitude into (-180, 180]; the antimeridian maps to +180.
pub(crate) fn wrap_longitude(degrees: f64) -> f64 {
    let wrapped = -((-degrees + 180.0).rem_euclid(360.0) - 180.0);
    if wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}
