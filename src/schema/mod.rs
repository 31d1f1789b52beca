//! Field-mapping schemas
//!
//! A schema is an ordered, frozen list of field descriptors. Each descriptor
//! knows how to move one named field between a raw stored record and a typed
//! line:
//!
//! - decode: raw → typed, may fail only on unmappable enum values
//! - encode: typed → raw, may fail only on unmappable enum values
//! - validate: returns messages, never fails
//! - complete: fills in defaults for unset or null attributes
//!
//! Schemas are built once through `SchemaBuilder` (or loaded from a
//! definition file through `SchemaLoader`) and shared read-only afterwards.

mod builder;
mod codec;
mod coerce;
mod decimal;
mod default;
mod errors;
mod line;
mod loader;
mod record;
mod types;
mod validator;

pub use builder::{SchemaBuilder, MAX_ENUM_MULTI_LABELS};
pub use decimal::{truncate as truncate_decimal, MAX_DECIMAL_PLACES};
pub use default::DefaultValue;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use line::{FieldStatus, Line};
pub use loader::{FieldDefinition, SchemaDefinition, SchemaLoader};
pub use record::{PathRecord, RawRecord, ROOT_PATH};
pub use types::{FieldDescriptor, FieldKind, IpVersion, LiteralValue, Schema};
pub use validator::{validate_date, validate_datetime, validate_time, Validator, MAX_PORT, MIN_PORT};
