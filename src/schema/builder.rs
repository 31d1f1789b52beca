//! Schema registration API
//!
//! Every registration consumes the builder and hands it back on success, so
//! a rejected registration leaves nothing behind to build from:
//!
//! ```ignore
//! let schema = SchemaBuilder::new("hosts")
//!     .integer("id", None)?
//!     .decimal("price", 2)?
//!     .enumeration("status", ["up", "down"], Some(DefaultValue::fixed("up")))?
//!     .build();
//! ```

use serde_json::Value;

use super::coerce::text;
use super::decimal::MAX_DECIMAL_PLACES;
use super::default::DefaultValue;
use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDescriptor, FieldKind, IpVersion, LiteralValue, Schema};
use crate::observability::{log_event_with_fields, Event};

/// Widest label list a packed multi-enum integer can represent.
pub const MAX_ENUM_MULTI_LABELS: usize = 64;

/// Accumulates field registrations for one schema.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Freezes the registrations into a schema.
    pub fn build(self) -> Schema {
        let count = self.fields.len().to_string();
        log_event_with_fields(
            Event::SchemaBuilt,
            &[("schema", self.name.as_str()), ("fields", count.as_str())],
        );
        Schema::new(self.name, self.fields)
    }

    pub fn boolean(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::Boolean, default)
    }

    pub fn string(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::String, default)
    }

    pub fn integer(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::Integer, default)
    }

    /// Registers a fixed-scale decimal with `dp` fractional digits.
    ///
    /// # Errors
    ///
    /// `FIELD_DECIMAL_DEFINITION` unless `0 <= dp <= 48`.
    pub fn decimal(self, name: &str, dp: i32) -> SchemaResult<Self> {
        if dp < 0 {
            return Err(self.reject(SchemaError::decimal_definition(
                &self.name,
                name,
                "DP should not be negative",
            )));
        }
        let dp = dp as u32;
        if dp > MAX_DECIMAL_PLACES {
            return Err(self.reject(SchemaError::decimal_definition(
                &self.name,
                name,
                format!("Max DP is {}", MAX_DECIMAL_PLACES),
            )));
        }
        self.push(name, FieldKind::Decimal { dp }, None)
    }

    /// Registers a single-valued enum stored as an index into `allowed`.
    ///
    /// # Errors
    ///
    /// `FIELD_ENUM_DEFINITION` when a fixed default is not an allowed label.
    pub fn enumeration<I, S>(
        self,
        name: &str,
        allowed: I,
        default: Option<DefaultValue>,
    ) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();

        if let Some(fixed) = fixed_default(&default) {
            let label = text(fixed);
            if !label.as_ref().map_or(false, |l| allowed.contains(l)) {
                return Err(self.reject(SchemaError::enum_definition(
                    &self.name,
                    name,
                    format!("default {} is not one of the allowed values", fixed),
                )));
            }
        }

        self.push(name, FieldKind::Enum { allowed }, default)
    }

    /// Registers a multi-valued enum stored as a bitmask over `allowed`.
    ///
    /// # Errors
    ///
    /// `FIELD_ENUM_DEFINITION` when `allowed` has more than 64 labels, or a
    /// fixed default selects a label outside `allowed`.
    pub fn enum_multi<I, S>(
        self,
        name: &str,
        allowed: I,
        default: Option<DefaultValue>,
    ) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();

        if allowed.len() > MAX_ENUM_MULTI_LABELS {
            return Err(self.reject(SchemaError::enum_definition(
                &self.name,
                name,
                format!(
                    "{} labels exceed the limit of {}",
                    allowed.len(),
                    MAX_ENUM_MULTI_LABELS
                ),
            )));
        }

        if let Some(fixed) = fixed_default(&default) {
            if let Some(reason) = invalid_selection(fixed, &allowed) {
                return Err(self.reject(SchemaError::enum_definition(&self.name, name, reason)));
            }
        }

        self.push(name, FieldKind::EnumMulti { allowed }, default)
    }

    /// Registers binary data stored as base64 and presented as hex.
    ///
    /// # Errors
    ///
    /// `FIELD_HEX_DEFINITION` when a fixed default is not hexadecimal.
    pub fn hex(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        if let Some(fixed) = fixed_default(&default) {
            let valid = text(fixed).map_or(false, |s| hex::decode(s).is_ok());
            if !valid {
                return Err(self.reject(SchemaError::hex_definition(
                    &self.name,
                    name,
                    &text(fixed).unwrap_or_else(|| fixed.to_string()),
                )));
            }
        }
        self.push(name, FieldKind::Hex, default)
    }

    pub fn ip_address(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.ip(name, IpVersion::Any, default)
    }

    pub fn ipv4_address(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.ip(name, IpVersion::V4, default)
    }

    pub fn ipv6_address(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.ip(name, IpVersion::V6, default)
    }

    /// Registers an address field of the given family.
    pub fn ip(
        self,
        name: &str,
        version: IpVersion,
        default: Option<DefaultValue>,
    ) -> SchemaResult<Self> {
        self.push(name, FieldKind::IpAddress { version }, default)
    }

    pub fn latitude(self, name: &str) -> SchemaResult<Self> {
        self.push(name, FieldKind::Latitude, None)
    }

    pub fn longitude(self, name: &str) -> SchemaResult<Self> {
        self.push(name, FieldKind::Longitude, None)
    }

    pub fn port(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::Port, default)
    }

    pub fn date(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::Date, default)
    }

    pub fn time(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::Time, default)
    }

    pub fn datetime(self, name: &str, default: Option<DefaultValue>) -> SchemaResult<Self> {
        self.push(name, FieldKind::DateTime, default)
    }

    /// Registers a constant that decodes to `value` regardless of input.
    ///
    /// # Errors
    ///
    /// `FIELD_LITERAL_DEFINITION` unless `value` is null, a string, a
    /// boolean, an `i64` integer or a float.
    pub fn literal(self, name: &str, value: impl Into<Value>) -> SchemaResult<Self> {
        let literal = match value.into() {
            Value::Null => LiteralValue::Null,
            Value::String(s) => LiteralValue::String(s),
            Value::Bool(b) => LiteralValue::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.is_f64(), n.as_f64()) {
                (Some(i), _, _) => LiteralValue::Int(i),
                (None, true, Some(f)) => LiteralValue::Float(f),
                _ => {
                    return Err(self.reject(SchemaError::literal_definition(
                        &self.name,
                        name,
                        "integer outside i64",
                    )));
                }
            },
            Value::Array(_) => {
                return Err(self.reject(SchemaError::literal_definition(&self.name, name, "array")));
            }
            Value::Object(_) => {
                return Err(self.reject(SchemaError::literal_definition(&self.name, name, "object")));
            }
        };
        self.push(name, FieldKind::Literal { value: literal }, None)
    }

    fn push(
        mut self,
        name: &str,
        kind: FieldKind,
        default: Option<DefaultValue>,
    ) -> SchemaResult<Self> {
        if self.fields.iter().any(|f| f.name() == name) {
            return Err(self.reject(SchemaError::duplicate_field(&self.name, name)));
        }
        self.fields.push(FieldDescriptor::new(name, kind, default));
        Ok(self)
    }

    fn reject(&self, err: SchemaError) -> SchemaError {
        log_event_with_fields(
            Event::DefinitionRejected,
            &[
                ("schema", self.name.as_str()),
                ("field", err.field().unwrap_or_default()),
                ("code", err.code().code()),
            ],
        );
        err
    }
}

/// Returns the fixed, non-null part of a default. Computed defaults cannot
/// be checked ahead of time.
fn fixed_default(default: &Option<DefaultValue>) -> Option<&Value> {
    default
        .as_ref()
        .and_then(DefaultValue::as_fixed)
        .filter(|v| !v.is_null())
}

fn invalid_selection(fixed: &Value, allowed: &[String]) -> Option<String> {
    match fixed {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => s
            .split(',')
            .find(|part| !allowed.iter().any(|a| a == part))
            .map(|part| format!("default label \"{}\" is not one of the allowed values", part)),
        Value::Number(n) => {
            let fits = n.as_u64().map_or(false, |mask| {
                allowed.len() >= 64 || mask >> allowed.len() == 0
            });
            (!fits).then(|| format!("default mask {} selects undeclared labels", n))
        }
        other => Some(format!("default {} is not a label list", other)),
    }
}
