//! The typed, mutable per-record object
//!
//! A `Line` is a bag of named attributes. An attribute that was never set is
//! distinct from one explicitly set to null; completion relies on telling the
//! two apart, so lookups go through `FieldStatus`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Presence of a single attribute on a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldStatus<'a> {
    /// Attribute has never been assigned
    Unset,
    /// Attribute is present and null
    SetNull,
    /// Attribute holds a non-null value
    SetValue(&'a Value),
}

impl<'a> FieldStatus<'a> {
    /// Returns the value when set and non-null.
    pub fn value(self) -> Option<&'a Value> {
        match self {
            FieldStatus::SetValue(v) => Some(v),
            FieldStatus::Unset | FieldStatus::SetNull => None,
        }
    }
}

/// A decoded record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Line {
    attrs: Map<String, Value>,
}

impl Line {
    /// Creates an empty line with every attribute unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing attribute map. Null entries become `SetNull`.
    pub fn from_map(attrs: Map<String, Value>) -> Self {
        Self { attrs }
    }

    /// Returns the presence state of `name`.
    pub fn status(&self, name: &str) -> FieldStatus<'_> {
        match self.attrs.get(name) {
            None => FieldStatus::Unset,
            Some(Value::Null) => FieldStatus::SetNull,
            Some(v) => FieldStatus::SetValue(v),
        }
    }

    /// Returns the non-null value of `name`, if any.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.status(name).value()
    }

    /// Returns the raw attribute, including an explicit null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Assigns `value` to `name`. Assigning `Value::Null` yields `SetNull`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn set_null(&mut self, name: impl Into<String>) {
        self.attrs.insert(name.into(), Value::Null);
    }

    /// Removes `name`, returning it to `Unset`.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.attrs.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.attrs
    }
}

impl From<Map<String, Value>> for Line {
    fn from(attrs: Map<String, Value>) -> Self {
        Self::from_map(attrs)
    }
}
