//! Observable events
//!
//! Events are emitted while schemas are built or loaded and around CLI
//! commands. Per-line operations emit nothing.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Schema construction
    /// All registrations succeeded and the schema is frozen
    SchemaBuilt,
    /// A schema definition file was read and built
    SchemaLoaded,
    /// A registration call failed; the schema is unusable
    DefinitionRejected,

    // CLI
    CommandStart,
    CommandComplete,
    CommandFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaBuilt => "SCHEMA_BUILT",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::DefinitionRejected => "DEFINITION_REJECTED",
            Event::CommandStart => "COMMAND_START",
            Event::CommandComplete => "COMMAND_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::DefinitionRejected)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Event::DefinitionRejected | Event::CommandFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
