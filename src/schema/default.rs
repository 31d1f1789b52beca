//! Default values applied during completion

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::line::Line;

type Compute = dyn Fn(&Line) -> Value + Send + Sync;

/// A default that is either fixed or computed from the line being completed.
///
/// A computed default may read any field completed before it; fields are
/// completed in registration order and cycles are not detected.
#[derive(Clone)]
pub enum DefaultValue {
    Fixed(Value),
    Computed(Arc<Compute>),
}

impl DefaultValue {
    pub fn fixed(value: impl Into<Value>) -> Self {
        DefaultValue::Fixed(value.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Line) -> Value + Send + Sync + 'static,
    {
        DefaultValue::Computed(Arc::new(f))
    }

    /// Resolves the default against `line`.
    pub fn resolve(&self, line: &Line) -> Value {
        match self {
            DefaultValue::Fixed(value) => value.clone(),
            DefaultValue::Computed(f) => f(line),
        }
    }

    /// Returns the fixed value, if this default is not computed.
    pub fn as_fixed(&self) -> Option<&Value> {
        match self {
            DefaultValue::Fixed(value) => Some(value),
            DefaultValue::Computed(_) => None,
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
