//! Schema loader for declarative schema definition files
//!
//! A definition file is a JSON document naming the schema and listing its
//! fields in registration order:
//!
//! ```json
//! {
//!   "name": "hosts",
//!   "fields": [
//!     { "name": "id", "kind": "integer" },
//!     { "name": "status", "kind": "enum", "allowed": ["up", "down"], "default": "up" }
//!   ]
//! }
//! ```
//!
//! Every definition is replayed through `SchemaBuilder`, so definition
//! errors are the same whether a schema comes from code or from disk.
//! Defaults declared in files are always fixed values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::builder::SchemaBuilder;
use super::default::DefaultValue;
use super::errors::{SchemaError, SchemaResult};
use super::types::{IpVersion, Schema};
use crate::observability::{log_event_with_fields, Event};

fn default_dp() -> i32 {
    2
}

/// Numbers inside an internally tagged entry arrive buffered, and exact
/// numbers only survive that buffering as a `Value`.
fn deserialize_dp<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value
        .as_i64()
        .and_then(|dp| i32::try_from(dp).ok())
        .ok_or_else(|| de::Error::custom(format!("dp must be an integer, got {}", value)))
}

/// One field entry of a schema definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum FieldDefinition {
    Boolean {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    String {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Integer {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Decimal {
        name: String,
        #[serde(default = "default_dp", deserialize_with = "deserialize_dp")]
        dp: i32,
    },
    Enum {
        name: String,
        allowed: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    EnumMulti {
        name: String,
        allowed: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Hex {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    IpAddress {
        name: String,
        #[serde(default)]
        version: IpVersion,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Latitude {
        name: String,
    },
    Longitude {
        name: String,
    },
    Port {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Date {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Time {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    #[serde(rename = "datetime")]
    DateTime {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Literal {
        name: String,
        value: Value,
    },
}

impl FieldDefinition {
    /// Registers this field on `builder`.
    fn register(self, builder: SchemaBuilder) -> SchemaResult<SchemaBuilder> {
        let fixed = |default: Option<Value>| default.map(DefaultValue::Fixed);

        match self {
            FieldDefinition::Boolean { name, default } => builder.boolean(&name, fixed(default)),
            FieldDefinition::String { name, default } => builder.string(&name, fixed(default)),
            FieldDefinition::Integer { name, default } => builder.integer(&name, fixed(default)),
            FieldDefinition::Decimal { name, dp } => builder.decimal(&name, dp),
            FieldDefinition::Enum {
                name,
                allowed,
                default,
            } => builder.enumeration(&name, allowed, fixed(default)),
            FieldDefinition::EnumMulti {
                name,
                allowed,
                default,
            } => builder.enum_multi(&name, allowed, fixed(default)),
            FieldDefinition::Hex { name, default } => builder.hex(&name, fixed(default)),
            FieldDefinition::IpAddress {
                name,
                version,
                default,
            } => builder.ip(&name, version, fixed(default)),
            FieldDefinition::Latitude { name } => builder.latitude(&name),
            FieldDefinition::Longitude { name } => builder.longitude(&name),
            FieldDefinition::Port { name, default } => builder.port(&name, fixed(default)),
            FieldDefinition::Date { name, default } => builder.date(&name, fixed(default)),
            FieldDefinition::Time { name, default } => builder.time(&name, fixed(default)),
            FieldDefinition::DateTime { name, default } => builder.datetime(&name, fixed(default)),
            FieldDefinition::Literal { name, value } => builder.literal(&name, value),
        }
    }
}

/// A complete schema definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl SchemaDefinition {
    /// Replays every field through a fresh builder.
    pub fn build(self) -> SchemaResult<Schema> {
        let builder = self
            .fields
            .into_iter()
            .try_fold(SchemaBuilder::new(self.name), |builder, field| {
                field.register(builder)
            })?;
        Ok(builder.build())
    }
}

/// Loads schema definition files and keeps the built schemas by name.
pub struct SchemaLoader {
    /// Directory containing definition files
    schema_dir: PathBuf,
    /// Built schemas indexed by schema name
    schemas: HashMap<String, Schema>,
}

impl SchemaLoader {
    /// Creates a loader reading `*.json` definitions from `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Parses and builds a schema from definition JSON.
    pub fn parse(content: &str) -> SchemaResult<Schema> {
        let definition: SchemaDefinition = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed_schema("<in-memory>", format!("Invalid JSON: {}", e)))?;
        definition.build()
    }

    /// Reads, parses and builds a single definition file.
    pub fn load_file(path: &Path) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let definition: SchemaDefinition = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        let schema = definition.build()?;

        let path_text = path.display().to_string();
        log_event_with_fields(
            Event::SchemaLoaded,
            &[("path", path_text.as_str()), ("schema", schema.name())],
        );

        Ok(schema)
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// A missing directory holds no schemas. Any unreadable, malformed or
    /// duplicate definition aborts the whole load.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let schema = Self::load_file(&path)?;
            self.register(schema)?;
        }

        Ok(())
    }

    /// Registers an already built schema.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        if self.schemas.contains_key(schema.name()) {
            return Err(SchemaError::malformed_schema(
                schema.name(),
                "a schema with this name is already loaded",
            ));
        }
        self.schemas.insert(schema.name().to_string(), schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;
    use crate::schema::types::FieldKind;
    use tempfile::TempDir;

    const HOSTS: &str = r#"{
        "name": "hosts",
        "fields": [
            { "name": "id", "kind": "integer" },
            { "name": "price", "kind": "decimal" },
            { "name": "status", "kind": "enum", "allowed": ["up", "down"], "default": "up" },
            { "name": "addr", "kind": "ip_address", "version": "v6" },
            { "name": "seen", "kind": "datetime" },
            { "name": "source", "kind": "literal", "value": "import" }
        ]
    }"#;

    #[test]
    fn test_parse_definition() {
        let schema = SchemaLoader::parse(HOSTS).unwrap();
        assert_eq!(schema.name(), "hosts");
        assert_eq!(schema.len(), 6);
        assert_eq!(
            schema.field("price").unwrap().kind(),
            &FieldKind::Decimal { dp: 2 }
        );
        assert_eq!(
            schema.field("addr").unwrap().kind(),
            &FieldKind::IpAddress {
                version: IpVersion::V6
            }
        );
        assert_eq!(schema.field("seen").unwrap().kind(), &FieldKind::DateTime);
    }

    #[test]
    fn test_definition_errors_surface() {
        let err = SchemaLoader::parse(
            r#"{"name": "s", "fields": [{"name": "d", "kind": "decimal", "dp": 49}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FieldDecimalDefinition);
    }

    #[test]
    fn test_decimal_places_must_be_integer() {
        let schema = SchemaLoader::parse(
            r#"{"name": "s", "fields": [{"name": "d", "kind": "decimal", "dp": 7}]}"#,
        )
        .unwrap();
        assert_eq!(
            schema.field("d").unwrap().kind(),
            &FieldKind::Decimal { dp: 7 }
        );

        for dp in [r#""2""#, "1.5", "4294967296"] {
            let content = format!(
                r#"{{"name": "s", "fields": [{{"name": "d", "kind": "decimal", "dp": {}}}]}}"#,
                dp
            );
            let err = SchemaLoader::parse(&content).unwrap_err();
            assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema, "dp {}", dp);
        }
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        let err = SchemaLoader::parse(r#"{"name": "s", "fields": [{"name": "x", "kind": "uuid"}]}"#)
            .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
    }

    #[test]
    fn test_unknown_key_is_malformed() {
        let err = SchemaLoader::parse(
            r#"{"name": "s", "fields": [{"name": "x", "kind": "latitude", "default": 1}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
    }

    #[test]
    fn test_load_all_and_get() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hosts.json"), HOSTS).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        assert_eq!(loader.schema_count(), 1);
        assert!(loader.exists("hosts"));
        assert_eq!(loader.get("hosts").unwrap().len(), 6);
    }

    #[test]
    fn test_duplicate_schema_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json"), HOSTS).unwrap();
        fs::write(temp_dir.path().join("b.json"), HOSTS).unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("absent"));
        loader.load_all().unwrap();
        assert_eq!(loader.schema_count(), 0);
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let err = SchemaLoader::load_file(&temp_dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
    }
}
