//! CLI argument definitions using clap
//!
//! Commands:
//! - linemap decode --schema <path>
//! - linemap encode --schema <path>
//! - linemap complete --schema <path>
//! - linemap validate --schema <path>
//! - linemap inspect --schema <path>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// linemap - map stored records to typed lines and back
#[derive(Parser, Debug)]
#[command(name = "linemap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lowest log severity written (trace, info, warn, error, fatal)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a raw record read from stdin into a line
    Decode {
        /// Path to the schema definition file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Encode a line read from stdin into a raw record
    Encode {
        /// Path to the schema definition file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Fill in defaults on a line read from stdin
    Complete {
        /// Path to the schema definition file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Validate a line read from stdin
    Validate {
        /// Path to the schema definition file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Describe the fields of a schema
    Inspect {
        /// Path to the schema definition file
        #[arg(long)]
        schema: PathBuf,
    },
}

impl Command {
    pub fn schema_path(&self) -> &Path {
        match self {
            Command::Decode { schema }
            | Command::Encode { schema }
            | Command::Complete { schema }
            | Command::Validate { schema }
            | Command::Inspect { schema } => schema,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Decode { .. } => "decode",
            Command::Encode { .. } => "encode",
            Command::Complete { .. } => "complete",
            Command::Validate { .. } => "validate",
            Command::Inspect { .. } => "inspect",
        }
    }

    /// Returns whether the command reads a JSON document from stdin.
    pub fn reads_input(&self) -> bool {
        !matches!(self, Command::Inspect { .. })
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
