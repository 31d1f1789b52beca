//! Observability for linemap
//!
//! Structured JSON logging of typed lifecycle events. Observability is
//! read-only: it never changes what an operation returns.
//!
//! ```ignore
//! use linemap::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::SchemaBuilt, &[("schema", "hosts")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, DEFAULT_MIN_SEVERITY};

fn severity_for(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}
