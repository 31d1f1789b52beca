//! CLI module for linemap
//!
//! Provides command-line access to a schema definition file:
//! - decode: raw record → line
//! - encode: line → raw record
//! - complete: fill in defaults
//! - validate: report validation messages
//! - inspect: describe the schema's fields

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{complete, decode, encode, inspect, run, run_command, validate};
pub use errors::{CliError, CliResult};
pub use io::{read_from, read_input, write_error, write_response};
