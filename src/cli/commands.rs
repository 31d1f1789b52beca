//! CLI command implementations
//!
//! Each command loads one schema definition file, reads at most one JSON
//! document from stdin and writes exactly one JSON response. The pure
//! functions below do the work and are what the tests drive.

use std::io::{self, Write};

use serde_json::{json, Map, Value};

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::schema::{FieldDescriptor, FieldKind, Line, PathRecord, Schema, SchemaLoader};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_error_to, write_response};

/// Parse arguments, configure logging and run the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if let Err(e) = configure_logging(&cli.log_level) {
        return report_failure(&mut io::stdout(), &cli.command, e);
    }
    run_command(&cli.command)
}

/// Run a command, writing either its result or its error to stdout.
pub fn run_command(command: &Command) -> CliResult<()> {
    let schema_path = command.schema_path().display().to_string();
    log_event_with_fields(
        Event::CommandStart,
        &[("command", command.name()), ("schema", schema_path.as_str())],
    );

    match execute(command) {
        Ok(data) => {
            write_response(data)?;
            log_event_with_fields(Event::CommandComplete, &[("command", command.name())]);
            Ok(())
        }
        Err(e) => report_failure(&mut io::stdout(), command, e),
    }
}

fn configure_logging(level: &str) -> CliResult<()> {
    let severity =
        Severity::parse(level).ok_or_else(|| CliError::InvalidLogLevel(level.to_string()))?;
    Logger::set_min_severity(severity);
    Ok(())
}

/// Logs `COMMAND_FAILED`, writes the error response and hands the error back.
fn report_failure<W: Write>(writer: &mut W, command: &Command, e: CliError) -> CliResult<()> {
    let message = e.to_string();
    log_event_with_fields(
        Event::CommandFailed,
        &[
            ("command", command.name()),
            ("code", e.code()),
            ("message", message.as_str()),
        ],
    );
    write_error_to(writer, e.code(), &message)?;
    Err(e)
}

fn execute(command: &Command) -> CliResult<Value> {
    let schema = SchemaLoader::load_file(command.schema_path())?;

    if !command.reads_input() {
        return Ok(inspect(&schema));
    }

    let input = read_input()?;
    match command {
        Command::Decode { .. } => decode(&schema, input),
        Command::Encode { .. } => encode(&schema, input),
        Command::Complete { .. } => complete(&schema, input),
        Command::Validate { .. } => validate(&schema, input),
        Command::Inspect { .. } => Ok(inspect(&schema)),
    }
}

/// Decode a raw record into a line.
///
/// A path-keyed object (every key starts with `/`, every value an object)
/// is read as a multi-path record; any other object is the root mapping.
pub fn decode(schema: &Schema, input: Value) -> CliResult<Value> {
    let line = match PathRecord::from_value(input.clone()) {
        Some(record) => schema.decode(&record)?,
        None => schema.decode(&expect_object(input, "raw record")?)?,
    };
    Ok(serde_json::to_value(line)?)
}

/// Encode a line into its raw mapping.
///
/// Accepts either a bare line or `{"line": {...}, "prior": {...}}`.
pub fn encode(schema: &Schema, input: Value) -> CliResult<Value> {
    let (line, prior) = split_encode_input(input)?;
    let raw = schema.encode(&line, prior.as_ref())?;
    Ok(Value::Object(raw))
}

/// Fill in defaults on a line.
pub fn complete(schema: &Schema, input: Value) -> CliResult<Value> {
    let mut line = Line::from_map(expect_object(input, "line")?);
    schema.complete(&mut line);
    Ok(serde_json::to_value(line)?)
}

/// Validate a line, reporting every message.
pub fn validate(schema: &Schema, input: Value) -> CliResult<Value> {
    let line = Line::from_map(expect_object(input, "line")?);
    let errors = schema.validate(&line);
    Ok(json!({
        "valid": errors.is_empty(),
        "errors": errors,
    }))
}

/// Describe each field of a schema and the behaviours it contributes.
pub fn inspect(schema: &Schema) -> Value {
    let fields: Vec<Value> = schema.fields().iter().map(describe_field).collect();
    json!({
        "name": schema.name(),
        "fields": fields,
    })
}

fn describe_field(field: &FieldDescriptor) -> Value {
    let kind = field.kind();
    let mut entry = Map::new();
    entry.insert("name".into(), json!(field.name()));
    entry.insert("kind".into(), json!(kind.type_name()));

    match kind {
        FieldKind::Decimal { dp } => {
            entry.insert("dp".into(), json!(dp));
        }
        FieldKind::IpAddress { version } => {
            entry.insert("version".into(), serde_json::to_value(version).unwrap_or(Value::Null));
        }
        FieldKind::Literal { value } => {
            entry.insert("value".into(), value.to_value());
        }
        _ => {}
    }
    if let Some(allowed) = kind.allowed() {
        entry.insert("allowed".into(), json!(allowed));
    }
    if let Some(fixed) = field.default().and_then(|d| d.as_fixed()) {
        entry.insert("default".into(), fixed.clone());
    }

    entry.insert(
        "behaviours".into(),
        json!({
            "decode": true,
            "encode": kind.has_encoder(),
            "validate": !kind.validators().is_empty(),
            "complete": kind.has_completer(),
        }),
    );
    Value::Object(entry)
}

fn split_encode_input(input: Value) -> CliResult<(Line, Option<Line>)> {
    let mut map = expect_object(input, "line")?;

    let wrapped = map.get("line").map_or(false, Value::is_object)
        && map.keys().all(|k| k == "line" || k == "prior");
    if !wrapped {
        return Ok((Line::from_map(map), None));
    }

    let line = match map.remove("line") {
        Some(value) => Line::from_map(expect_object(value, "line")?),
        None => Line::new(),
    };
    let prior = match map.remove("prior") {
        None | Some(Value::Null) => None,
        Some(value) => Some(Line::from_map(expect_object(value, "prior")?)),
    };
    Ok((line, prior))
}

fn expect_object(value: Value, what: &str) -> CliResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CliError::invalid_input(format!(
            "Expected {} to be a JSON object, got {}",
            what,
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
