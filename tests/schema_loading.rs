//! Schema Loading Tests
//!
//! Declarative schema definition files:
//! - Every field kind loads from JSON and behaves like its coded twin
//! - Definition errors surface the same way as from `SchemaBuilder`
//! - Unreadable or malformed files are rejected as malformed schemas
//! - Directory loading is all-or-nothing and rejects duplicate names

use std::fs;
use std::path::Path;

use linemap::schema::{
    FieldKind, IpVersion, Line, SchemaDefinition, SchemaErrorCode, SchemaLoader,
};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_schema(dir: &Path, file: &str, content: &Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(content).unwrap()).unwrap();
}

fn hosts_definition() -> Value {
    json!({
        "name": "hosts",
        "fields": [
            { "name": "id", "kind": "integer" },
            { "name": "price", "kind": "decimal", "dp": 3 },
            { "name": "status", "kind": "enum", "allowed": ["up", "down"], "default": "up" },
            { "name": "flags", "kind": "enum_multi", "allowed": ["a", "b", "c"] },
            { "name": "mac", "kind": "hex" },
            { "name": "addr", "kind": "ip_address", "version": "v6" },
            { "name": "lat", "kind": "latitude" },
            { "name": "lng", "kind": "longitude" },
            { "name": "port", "kind": "port", "default": 22 },
            { "name": "day", "kind": "date" },
            { "name": "at", "kind": "time" },
            { "name": "stamp", "kind": "datetime" },
            { "name": "active", "kind": "boolean" },
            { "name": "label", "kind": "string" },
            { "name": "source", "kind": "literal", "value": "import" }
        ]
    })
}

// =============================================================================
// Single File Tests
// =============================================================================

#[test]
fn test_load_every_kind() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "hosts.json", &hosts_definition());

    let schema = SchemaLoader::load_file(&tmp.path().join("hosts.json")).unwrap();

    assert_eq!(schema.name(), "hosts");
    assert_eq!(schema.len(), 15);

    let kinds: Vec<&str> = schema.fields().iter().map(|f| f.kind().type_name()).collect();
    assert_eq!(
        kinds,
        vec![
            "integer", "decimal", "enum", "enum_multi", "hex", "ip_address", "latitude",
            "longitude", "port", "date", "time", "datetime", "boolean", "string", "literal",
        ]
    );

    assert_eq!(
        schema.field("price").map(|f| f.kind().clone()),
        Some(FieldKind::Decimal { dp: 3 })
    );
    assert_eq!(
        schema.field("addr").map(|f| f.kind().clone()),
        Some(FieldKind::IpAddress {
            version: IpVersion::V6
        })
    );
}

#[test]
fn test_loaded_schema_round_trips() {
    let schema = SchemaLoader::parse(&hosts_definition().to_string()).unwrap();

    let mut line = Line::new();
    line.set("id", 42);
    line.set("price", "9.87654");
    line.set("flags", "c,a");
    line.set("addr", "2001:0db8:0000:0000:0000:0000:0000:0001");
    schema.complete(&mut line);

    assert_eq!(line.get("status"), Some(&json!("up")));
    assert_eq!(line.get("port"), Some(&json!(22)));
    assert!(schema.validate(&line).is_empty());

    let raw = schema.encode(&line, None).unwrap();
    assert_eq!(raw.get("price"), Some(&json!("9.876")));
    assert_eq!(raw.get("status"), Some(&json!(0)));
    assert_eq!(raw.get("flags"), Some(&json!(5)));
    assert_eq!(raw.get("addr"), Some(&json!("2001:db8::1")));
    assert!(raw.get("source").is_none());

    let decoded = schema.decode(&raw).unwrap();
    assert_eq!(decoded.get("id"), Some(&json!(42)));
    assert_eq!(decoded.get("price"), Some(&json!(9.876)));
    assert_eq!(decoded.get("flags"), Some(&json!("a,c")));
    assert_eq!(decoded.get("source"), Some(&json!("import")));
}

#[test]
fn test_decimal_places_default_to_two() {
    let schema = SchemaLoader::parse(
        r#"{ "name": "s", "fields": [ { "name": "amount", "kind": "decimal" } ] }"#,
    )
    .unwrap();

    assert_eq!(
        schema.field("amount").map(|f| f.kind().clone()),
        Some(FieldKind::Decimal { dp: 2 })
    );
}

#[test]
fn test_definition_errors_match_builder() {
    let cases = [
        (
            json!({ "name": "amount", "kind": "decimal", "dp": 49 }),
            SchemaErrorCode::FieldDecimalDefinition,
        ),
        (
            json!({ "name": "status", "kind": "enum", "allowed": ["a"], "default": "b" }),
            SchemaErrorCode::FieldEnumDefinition,
        ),
        (
            json!({ "name": "mac", "kind": "hex", "default": "nothex" }),
            SchemaErrorCode::FieldHexDefinition,
        ),
        (
            json!({ "name": "source", "kind": "literal", "value": { "nested": true } }),
            SchemaErrorCode::FieldLiteralDefinition,
        ),
    ];

    for (field, code) in cases {
        let definition = json!({ "name": "broken", "fields": [field] });
        let err = SchemaLoader::parse(&definition.to_string()).unwrap_err();
        assert_eq!(err.code(), code, "definition {}", definition);
        assert!(err.is_definition_error());
        assert_eq!(err.schema_name(), Some("broken"));
    }
}

#[test]
fn test_duplicate_field_rejected() {
    let definition = json!({
        "name": "dupes",
        "fields": [
            { "name": "id", "kind": "integer" },
            { "name": "id", "kind": "string" }
        ]
    });

    let err = SchemaLoader::parse(&definition.to_string()).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldDuplicateName);
    assert_eq!(err.field(), Some("id"));
}

#[test]
fn test_unknown_kind_and_keys_rejected() {
    let unknown_kind = r#"{ "name": "s", "fields": [ { "name": "x", "kind": "money" } ] }"#;
    let err = SchemaLoader::parse(unknown_kind).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);

    let unknown_key = r#"{ "name": "s", "fields": [ { "name": "x", "kind": "date", "format": "iso" } ] }"#;
    let err = SchemaLoader::parse(unknown_key).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);

    let unknown_top = r#"{ "name": "s", "version": 2, "fields": [] }"#;
    let err = SchemaLoader::parse(unknown_top).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
}

#[test]
fn test_missing_file_is_malformed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.json");

    let err = SchemaLoader::load_file(&path).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
    assert!(err.message().contains("absent.json"));
}

#[test]
fn test_invalid_json_is_malformed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{ \"name\": ").unwrap();

    let err = SchemaLoader::load_file(&path).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
}

#[test]
fn test_definition_serializes_back() {
    let definition: SchemaDefinition = serde_json::from_value(hosts_definition()).unwrap();
    let rendered = serde_json::to_value(&definition).unwrap();

    let fields = rendered["fields"].as_array().unwrap();
    assert_eq!(fields[1], json!({ "kind": "decimal", "name": "price", "dp": 3 }));
    assert_eq!(fields[11]["kind"], json!("datetime"));

    let reparsed: SchemaDefinition = serde_json::from_value(rendered).unwrap();
    assert_eq!(reparsed, definition);
}

// =============================================================================
// Directory Loading Tests
// =============================================================================

#[test]
fn test_load_all_from_directory() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "hosts.json", &hosts_definition());
    write_schema(
        tmp.path(),
        "users.json",
        &json!({ "name": "users", "fields": [ { "name": "email", "kind": "string" } ] }),
    );
    fs::write(tmp.path().join("notes.txt"), "not a schema").unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    loader.load_all().unwrap();

    assert_eq!(loader.schema_dir(), tmp.path());
    assert_eq!(loader.schema_count(), 2);
    assert!(loader.exists("hosts"));
    assert!(loader.exists("users"));
    assert!(!loader.exists("notes"));

    let users = loader.get("users").unwrap();
    let decoded = users
        .decode(&Map::from_iter([("email".to_string(), json!("a@b.c"))]))
        .unwrap();
    assert_eq!(decoded.get("email"), Some(&json!("a@b.c")));

    let mut names: Vec<&str> = loader.all_schemas().map(|s| s.name()).collect();
    names.sort();
    assert_eq!(names, vec!["hosts", "users"]);
}

#[test]
fn test_load_all_missing_directory_is_empty() {
    let tmp = TempDir::new().unwrap();
    let mut loader = SchemaLoader::new(&tmp.path().join("nowhere"));

    loader.load_all().unwrap();
    assert_eq!(loader.schema_count(), 0);
}

#[test]
fn test_load_all_rejects_duplicate_schema_names() {
    let tmp = TempDir::new().unwrap();
    write_schema(tmp.path(), "a.json", &hosts_definition());
    write_schema(tmp.path(), "b.json", &hosts_definition());

    let mut loader = SchemaLoader::new(tmp.path());
    let err = loader.load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldMalformedSchema);
}

#[test]
fn test_load_all_stops_on_definition_error() {
    let tmp = TempDir::new().unwrap();
    write_schema(
        tmp.path(),
        "bad.json",
        &json!({ "name": "bad", "fields": [ { "name": "d", "kind": "decimal", "dp": -1 } ] }),
    );

    let mut loader = SchemaLoader::new(tmp.path());
    let err = loader.load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::FieldDecimalDefinition);
}
