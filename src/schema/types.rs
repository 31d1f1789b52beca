//! Field kinds, field descriptors and the schema
//!
//! Supported kinds:
//! - boolean, string, integer
//! - decimal: fixed scale, stored as an exact decimal string
//! - enum: stored as an index into the allowed labels
//! - enum_multi: stored as a bitmask over the allowed labels
//! - hex: stored as base64, presented as lowercase hex
//! - ip_address (any, v4, v6): canonicalized text
//! - latitude, longitude, port
//! - date, time, datetime: text with format validation
//! - literal: a constant, never read from or written to storage

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::codec;
use super::default::DefaultValue;
use super::errors::SchemaResult;
use super::line::{FieldStatus, Line};
use super::record::RawRecord;
use super::validator::Validator;

/// Address family accepted by an IP address field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    #[default]
    Any,
    V4,
    V6,
}

/// The constant carried by a literal field.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl LiteralValue {
    pub fn to_value(&self) -> Value {
        match self {
            LiteralValue::Null => Value::Null,
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Int(i) => Value::from(*i),
            LiteralValue::Float(f) => super::coerce::float_value(*f),
        }
    }
}

/// The closed set of field behaviours.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Boolean,
    String,
    Integer,
    Decimal { dp: u32 },
    Enum { allowed: Vec<String> },
    EnumMulti { allowed: Vec<String> },
    Hex,
    IpAddress { version: IpVersion },
    Latitude,
    Longitude,
    Port,
    Date,
    Time,
    DateTime,
    Literal { value: LiteralValue },
}

impl FieldKind {
    /// Returns the kind name used in schema definition files
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Decimal { .. } => "decimal",
            FieldKind::Enum { .. } => "enum",
            FieldKind::EnumMulti { .. } => "enum_multi",
            FieldKind::Hex => "hex",
            FieldKind::IpAddress { .. } => "ip_address",
            FieldKind::Latitude => "latitude",
            FieldKind::Longitude => "longitude",
            FieldKind::Port => "port",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::DateTime => "datetime",
            FieldKind::Literal { .. } => "literal",
        }
    }

    /// Returns whether the kind fills in defaults during completion.
    pub fn has_completer(&self) -> bool {
        !matches!(
            self,
            FieldKind::Decimal { .. }
                | FieldKind::Latitude
                | FieldKind::Longitude
                | FieldKind::Literal { .. }
        )
    }

    /// Returns whether the kind writes back to storage.
    pub fn has_encoder(&self) -> bool {
        !matches!(self, FieldKind::Literal { .. })
    }

    /// Returns the validators contributed by this kind, in run order.
    pub fn validators(&self) -> &'static [Validator] {
        match self {
            FieldKind::Enum { .. } => &[Validator::EnumMember],
            FieldKind::EnumMulti { .. } => &[Validator::EnumMembers],
            FieldKind::Hex => &[Validator::Hex],
            FieldKind::IpAddress {
                version: IpVersion::Any,
            } => &[Validator::IpAddress],
            FieldKind::IpAddress {
                version: IpVersion::V4,
            } => &[Validator::IpAddress, Validator::Ipv4],
            FieldKind::IpAddress {
                version: IpVersion::V6,
            } => &[Validator::IpAddress, Validator::Ipv6],
            FieldKind::Port => &[Validator::PortRange],
            FieldKind::Date => &[Validator::Date],
            FieldKind::Time => &[Validator::Time],
            FieldKind::DateTime => &[Validator::DateTime],
            _ => &[],
        }
    }

    /// Returns the allowed labels of an enum kind.
    pub fn allowed(&self) -> Option<&[String]> {
        match self {
            FieldKind::Enum { allowed } | FieldKind::EnumMulti { allowed } => Some(allowed),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A single registered field: how it decodes, encodes, validates and
/// completes.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    default: Option<DefaultValue>,
}

impl FieldDescriptor {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: FieldKind,
        default: Option<DefaultValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Reads this field from the root of `record`.
    ///
    /// `schema_name` only appears in error messages.
    pub fn decode<R>(&self, schema_name: &str, record: &R) -> SchemaResult<Value>
    where
        R: RawRecord + ?Sized,
    {
        codec::decode(self, schema_name, record.get(&self.name))
    }

    /// Produces the raw value for this field, or `None` for read-only kinds.
    pub fn encode(
        &self,
        schema_name: &str,
        line: &Line,
        prior: Option<&Line>,
    ) -> SchemaResult<Option<Value>> {
        if !self.kind.has_encoder() {
            return Ok(None);
        }
        codec::encode(self, schema_name, line, prior).map(Some)
    }

    /// Runs every validator of this field, returning the messages produced.
    pub fn validate(&self, line: &Line) -> Vec<String> {
        self.kind
            .validators()
            .iter()
            .filter_map(|v| v.check(self, line))
            .collect()
    }

    /// Assigns the default when the attribute is unset or null.
    ///
    /// Enum kinds also treat `""` as missing, unless `""` is itself an
    /// allowed label. Running this twice leaves the line unchanged.
    pub fn complete(&self, line: &mut Line) {
        if !self.kind.has_completer() {
            return;
        }

        let needs_default = match line.status(&self.name) {
            FieldStatus::Unset | FieldStatus::SetNull => true,
            FieldStatus::SetValue(Value::String(s)) if s.is_empty() => self
                .kind
                .allowed()
                .map_or(false, |allowed| !allowed.iter().any(String::is_empty)),
            FieldStatus::SetValue(_) => false,
        };
        if !needs_default {
            return;
        }

        let value = self
            .default
            .as_ref()
            .map_or(Value::Null, |d| d.resolve(line));
        let value = match &self.kind {
            FieldKind::EnumMulti { allowed } => codec::canonical_selection(&value, allowed),
            _ => value,
        };
        line.set(self.name.clone(), value);
    }
}

/// An ordered, frozen set of field descriptors.
///
/// Built through `SchemaBuilder`; immutable afterwards and safe to share
/// between threads working on separate lines.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub(crate) fn new(name: String, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the descriptors in registration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decodes a raw record into a new line, field by field.
    ///
    /// # Errors
    ///
    /// Returns a `FIELD_ENUM_VALUE` error when an enum index has no label.
    pub fn decode<R>(&self, record: &R) -> SchemaResult<Line>
    where
        R: RawRecord + ?Sized,
    {
        let mut line = Line::new();
        for field in &self.fields {
            let value = field.decode(&self.name, record)?;
            line.set(field.name.clone(), value);
        }
        Ok(line)
    }

    /// Encodes `line` into a raw mapping. Literal fields are omitted.
    ///
    /// # Errors
    ///
    /// Returns a `FIELD_ENUM_VALUE` error when an enum label is not allowed.
    pub fn encode(&self, line: &Line, prior: Option<&Line>) -> SchemaResult<Map<String, Value>> {
        let mut raw = Map::new();
        for field in &self.fields {
            if let Some(value) = field.encode(&self.name, line, prior)? {
                raw.insert(field.name.clone(), value);
            }
        }
        Ok(raw)
    }

    /// Collects every validation message, in registration order.
    pub fn validate(&self, line: &Line) -> Vec<String> {
        self.fields.iter().flat_map(|f| f.validate(line)).collect()
    }

    /// Fills in defaults for every field, in registration order.
    pub fn complete(&self, line: &mut Line) {
        for field in &self.fields {
            field.complete(line);
        }
    }
}
