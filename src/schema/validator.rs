//! Built-in line validators
//!
//! Validators never fail: each returns an optional human-readable message
//! naming the field. Absent and null values pass every validator except the
//! enum membership check, since an enum with no label cannot be encoded.

use std::net::IpAddr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::coerce::{numeric, text, truthy};
use super::line::Line;
use super::types::FieldDescriptor;

/// Lowest valid port number
pub const MIN_PORT: f64 = 1.0;
/// Highest valid port number
pub const MAX_PORT: f64 = 65535.0;

static DATE_FORMAT: OnceLock<Regex> = OnceLock::new();
static TIME_FORMAT: OnceLock<Regex> = OnceLock::new();

fn date_format() -> &'static Regex {
    DATE_FORMAT.get_or_init(|| {
        Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("date pattern compiles")
    })
}

fn time_format() -> &'static Regex {
    TIME_FORMAT.get_or_init(|| {
        Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})$").expect("time pattern compiles")
    })
}

/// A single built-in check contributed by a field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Value must be one of the allowed labels
    EnumMember,
    /// Every comma-separated label must be allowed
    EnumMembers,
    /// Non-empty values must be hexadecimal
    Hex,
    /// Non-empty values must parse as an address
    IpAddress,
    /// Non-empty values must look like IPv4
    Ipv4,
    /// Non-empty values must look like IPv6
    Ipv6,
    /// Present values must lie in [1, 65535]
    PortRange,
    /// `YYYY-MM-DD` and a real calendar date
    Date,
    /// `HH:MM:SS` within the clock range
    Time,
    /// A date and a time separated by one space
    DateTime,
}

impl Validator {
    /// Checks `field` on `line`, returning a message on failure.
    pub fn check(&self, field: &FieldDescriptor, line: &Line) -> Option<String> {
        let name = field.name();
        let value = line.value(name);

        match self {
            Validator::EnumMember => {
                let allowed = field.kind().allowed().unwrap_or_default();
                let label = value.and_then(text);
                match label {
                    Some(l) if allowed.iter().any(|a| *a == l) => None,
                    _ => Some(format!("Invalid {}", name)),
                }
            }
            Validator::EnumMembers => {
                let allowed = field.kind().allowed().unwrap_or_default();
                let selected = value.filter(|v| truthy(v)).and_then(text)?;
                selected
                    .split(',')
                    .find(|part| !allowed.iter().any(|a| a == part))
                    .map(|part| format!("Invalid {}. Unrecognised value \"{}\"", name, part))
            }
            Validator::Hex => {
                let s = non_empty_text(value)?;
                hex::decode(&s)
                    .is_err()
                    .then(|| format!("Invalid hexadecimal value for {}", name))
            }
            Validator::IpAddress => {
                let s = non_empty_text(value)?;
                s.parse::<IpAddr>()
                    .is_err()
                    .then(|| format!("{} is not a valid ip address", name))
            }
            Validator::Ipv4 => {
                let s = non_empty_text(value)?;
                (!s.contains('.')).then(|| format!("{} is not an ipv4 address", name))
            }
            Validator::Ipv6 => {
                let s = non_empty_text(value)?;
                (!s.contains(':')).then(|| format!("{} is not an ipv6 address", name))
            }
            Validator::PortRange => {
                let in_range = numeric(value?).map_or(false, |p| (MIN_PORT..=MAX_PORT).contains(&p));
                (!in_range).then(|| format!("{} is out of range", name))
            }
            Validator::Date => validate_date(&text(value?).unwrap_or_default(), name),
            Validator::Time => validate_time(&text(value?).unwrap_or_default(), name),
            Validator::DateTime => validate_datetime(&text(value?).unwrap_or_default(), name),
        }
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value.and_then(text).filter(|s| !s.is_empty())
}

/// Checks a `YYYY-MM-DD` date, format first, then calendar validity.
pub fn validate_date(date: &str, name: &str) -> Option<String> {
    let Some(caps) = date_format().captures(date) else {
        return Some(format!("{} is not in expected format of YYYY-MM-DD", name));
    };

    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;

    if year < 1 || NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Some(format!("{} is not an actual date", name));
    }

    None
}

/// Checks an `HH:MM:SS` time.
pub fn validate_time(time: &str, name: &str) -> Option<String> {
    let Some(caps) = time_format().captures(time) else {
        return Some(format!("{} is not in expected format of HH:MM:SS", name));
    };

    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps[3].parse().ok()?;

    if hour > 23 {
        return Some(format!("{} has an invalid hour", name));
    }
    if minute > 59 {
        return Some(format!("{} has an invalid minute", name));
    }
    if second > 59 {
        return Some(format!("{} has an invalid second", name));
    }

    None
}

/// Checks a `YYYY-MM-DD HH:MM:SS` value. The date error wins when both
/// components are wrong.
pub fn validate_datetime(datetime: &str, name: &str) -> Option<String> {
    let parts: Vec<&str> = datetime.split(' ').collect();
    let [date, time] = parts.as_slice() else {
        return Some(format!("{} is not in expected format of DATE TIME", name));
    };

    validate_date(date, &format!("{} (date component)", name))
        .or_else(|| validate_time(time, &format!("{} (time component)", name)))
}
