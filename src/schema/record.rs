//! Raw record access
//!
//! Raw records are owned by whatever stores them. Decoding only needs a
//! read-only, path-scoped key lookup; every field reads from the root path.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Path every field is read from.
pub const ROOT_PATH: &str = "/";

/// Read-only access to a stored record.
pub trait RawRecord {
    /// Returns the name → raw value mapping stored at `path`.
    fn path(&self, path: &str) -> Option<&Map<String, Value>>;

    /// Returns the raw value of `name` under the root path.
    fn get(&self, name: &str) -> Option<&Value> {
        self.path(ROOT_PATH).and_then(|root| root.get(name))
    }
}

/// A bare mapping is a record with only a root path.
impl RawRecord for Map<String, Value> {
    fn path(&self, path: &str) -> Option<&Map<String, Value>> {
        (path == ROOT_PATH).then_some(self)
    }
}

/// A record holding several path-addressed mappings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRecord {
    paths: BTreeMap<String, Map<String, Value>>,
}

impl PathRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record whose root path holds `root`.
    pub fn with_root(root: Map<String, Value>) -> Self {
        let mut record = Self::new();
        record.insert(ROOT_PATH, root);
        record
    }

    pub fn insert(&mut self, path: impl Into<String>, values: Map<String, Value>) {
        self.paths.insert(path.into(), values);
    }

    /// Interprets a JSON object as a record.
    ///
    /// An object whose keys all start with `/` and whose values are all
    /// objects is read as path-keyed; any other object becomes the root.
    /// Returns `None` for non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(obj) = value else {
            return None;
        };

        let path_keyed = !obj.is_empty()
            && obj
                .iter()
                .all(|(k, v)| k.starts_with('/') && v.is_object());

        if !path_keyed {
            return Some(Self::with_root(obj));
        }

        let mut record = Self::new();
        for (path, values) in obj {
            if let Value::Object(values) = values {
                record.insert(path, values);
            }
        }
        Some(record)
    }
}

impl RawRecord for PathRecord {
    fn path(&self, path: &str) -> Option<&Map<String, Value>> {
        self.paths.get(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_is_root_only() {
        let Value::Object(map) = json!({"port": 22}) else {
            unreachable!()
        };
        assert_eq!(map.get("port"), Some(&json!(22)));
        assert_eq!(RawRecord::get(&map, "port"), Some(&json!(22)));
        assert!(map.path("/other").is_none());
    }

    #[test]
    fn test_path_keyed_value() {
        let record = PathRecord::from_value(json!({
            "/": {"name": "edge"},
            "/meta": {"name": "ignored"}
        }))
        .unwrap();
        assert_eq!(record.get("name"), Some(&json!("edge")));
        assert_eq!(
            record.path("/meta").and_then(|m| m.get("name")),
            Some(&json!("ignored"))
        );
    }

    #[test]
    fn test_flat_value_becomes_root() {
        let record = PathRecord::from_value(json!({"name": "edge"})).unwrap();
        assert_eq!(record.get("name"), Some(&json!("edge")));
        assert!(PathRecord::from_value(json!([1, 2])).is_none());
    }
}
