//! Schema error types
//!
//! Error codes:
//! - FIELD_DECIMAL_DEFINITION (FATAL)
//! - FIELD_ENUM_DEFINITION (FATAL)
//! - FIELD_HEX_DEFINITION (FATAL)
//! - FIELD_LITERAL_DEFINITION (FATAL)
//! - FIELD_DUPLICATE_NAME (FATAL)
//! - FIELD_MALFORMED_SCHEMA (FATAL)
//! - FIELD_ENUM_VALUE (REJECT)
//!
//! Definition errors are raised while a schema is being built and leave no
//! usable schema behind. Enum value errors are raised per record, while
//! decoding or encoding a line. Validation failures are not errors at all:
//! they are returned as messages by `Schema::validate`.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The record being decoded or encoded is rejected
    Reject,
    /// The schema definition is broken and cannot be used
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Decimal places outside [0, 48]
    FieldDecimalDefinition,
    /// Enum default outside the allowed labels, or too many labels
    FieldEnumDefinition,
    /// Hex default is not hexadecimal
    FieldHexDefinition,
    /// Literal of an unsupported type
    FieldLiteralDefinition,
    /// Field name registered twice
    FieldDuplicateName,
    /// Schema definition file unreadable or invalid
    FieldMalformedSchema,
    /// Raw index or line label with no enum counterpart
    FieldEnumValue,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FieldDecimalDefinition => "FIELD_DECIMAL_DEFINITION",
            SchemaErrorCode::FieldEnumDefinition => "FIELD_ENUM_DEFINITION",
            SchemaErrorCode::FieldHexDefinition => "FIELD_HEX_DEFINITION",
            SchemaErrorCode::FieldLiteralDefinition => "FIELD_LITERAL_DEFINITION",
            SchemaErrorCode::FieldDuplicateName => "FIELD_DUPLICATE_NAME",
            SchemaErrorCode::FieldMalformedSchema => "FIELD_MALFORMED_SCHEMA",
            SchemaErrorCode::FieldEnumValue => "FIELD_ENUM_VALUE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::FieldEnumValue => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Schema name if applicable
    schema_name: Option<String>,
    /// Field name if applicable
    field: Option<String>,
}

impl SchemaError {
    fn new(
        code: SchemaErrorCode,
        message: String,
        schema_name: Option<String>,
        field: Option<String>,
    ) -> Self {
        Self {
            code,
            message,
            schema_name,
            field,
        }
    }

    /// Create an invalid decimal places error
    pub fn decimal_definition(
        schema_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::FieldDecimalDefinition,
            format!("Decimal field '{}': {}", field, reason.into()),
            Some(schema_name.into()),
            Some(field),
        )
    }

    /// Create an invalid enum definition error
    pub fn enum_definition(
        schema_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::FieldEnumDefinition,
            format!("Enum field '{}': {}", field, reason.into()),
            Some(schema_name.into()),
            Some(field),
        )
    }

    /// Create an invalid hex default error
    pub fn hex_definition(
        schema_name: impl Into<String>,
        field: impl Into<String>,
        default: &str,
    ) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::FieldHexDefinition,
            format!(
                "Hex field '{}': default \"{}\" is not valid hexadecimal",
                field, default
            ),
            Some(schema_name.into()),
            Some(field),
        )
    }

    /// Create an unsupported literal type error
    pub fn literal_definition(
        schema_name: impl Into<String>,
        field: impl Into<String>,
        type_name: &str,
    ) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::FieldLiteralDefinition,
            format!(
                "Literal field '{}': unsupported literal type '{}'",
                field, type_name
            ),
            Some(schema_name.into()),
            Some(field),
        )
    }

    /// Create a duplicate field name error
    pub fn duplicate_field(schema_name: impl Into<String>, field: impl Into<String>) -> Self {
        let schema_name = schema_name.into();
        let field = field.into();
        Self::new(
            SchemaErrorCode::FieldDuplicateName,
            format!(
                "Field '{}' is already registered on schema '{}'",
                field, schema_name
            ),
            Some(schema_name),
            Some(field),
        )
    }

    /// Create an error for a malformed schema definition file
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::FieldMalformedSchema,
            format!(
                "Malformed schema definition '{}': {}",
                path.into(),
                reason.into()
            ),
            None,
            None,
        )
    }

    /// Create an error for a raw index with no matching label
    pub fn enum_decode(
        schema_name: &str,
        field: &str,
        raw: impl fmt::Display,
        allowed: &[String],
    ) -> Self {
        Self::new(
            SchemaErrorCode::FieldEnumValue,
            format!(
                "Could not decode enum \"{}->{}\" with value \"{}\". Expected one of [{}]",
                schema_name,
                field,
                raw,
                quote_all(allowed)
            ),
            Some(schema_name.to_string()),
            Some(field.to_string()),
        )
    }

    /// Create an error for a line label with no matching index
    pub fn enum_encode(
        schema_name: &str,
        field: &str,
        value: impl fmt::Display,
        allowed: &[String],
    ) -> Self {
        Self::new(
            SchemaErrorCode::FieldEnumValue,
            format!(
                "Could not encode enum \"{}->{}\" with value \"{}\". Expected one of [{}]",
                schema_name,
                field,
                value,
                quote_all(allowed)
            ),
            Some(schema_name.to_string()),
            Some(field.to_string()),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema name if applicable
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns whether this error was raised while defining a schema
    pub fn is_definition_error(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

fn quote_all(allowed: &[String]) -> String {
    allowed
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
