//! linemap - declarative field mapping between stored records and typed lines
//!
//! A schema registers named fields of a fixed set of kinds. Each field knows
//! how to decode its raw stored value, encode it back, validate it and fill
//! in a default when it is missing.

pub mod cli;
pub mod observability;
pub mod schema;
