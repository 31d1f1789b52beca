//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::schema::SchemaError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Schema(e) => e.code().code(),
            CliError::Io(_) => "LINEMAP_CLI_IO_ERROR",
            CliError::Json(_) => "LINEMAP_CLI_JSON_ERROR",
            CliError::InvalidInput(_) => "LINEMAP_CLI_INVALID_INPUT",
            CliError::InvalidLogLevel(_) => "LINEMAP_CLI_CONFIG_ERROR",
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CliError::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_keeps_code() {
        let err: CliError = SchemaError::malformed_schema("x.json", "Invalid JSON").into();
        assert_eq!(err.code(), "FIELD_MALFORMED_SCHEMA");
        assert!(err.to_string().contains("x.json"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            CliError::invalid_input("expected object").code(),
            "LINEMAP_CLI_INVALID_INPUT"
        );
        let io_err: CliError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert_eq!(io_err.code(), "LINEMAP_CLI_IO_ERROR");
        assert!(io_err.to_string().contains("boom"));
    }
}
