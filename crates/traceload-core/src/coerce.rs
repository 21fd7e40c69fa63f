//! Value coercion: raw trace text to typed values
//!
//! Inference runs an ordered rule table (integer, decimal, timestamp) and
//! returns the first rule that produces a value; text no rule accepts stays
//! a string. Timestamp encodings differ per source format.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

use crate::value::TypedValue;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("valid regex"));

/// `2023-08-08T09:09:43.887-04:00`, fraction optional, `Z` allowed
static ISO_8601: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?([+-][0-9]{2}:[0-9]{2}|Z)$")
        .expect("valid regex")
});

/// `10:01:00.0554208 AM`: exactly seven sub-second digits, ASCII only
static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}:[0-9]{2}:[0-9]{2}\.[0-9]{7} [AP]M$").expect("valid regex"));

/// Primary then fallback layout for ISO-like trace timestamps
const ISO_8601_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%:z"];

/// Time-of-day values carry no date; they are anchored here
const TIME_OF_DAY_ANCHOR: &str = "1900-01-01";

/// Source-specific timestamp encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `YYYY-MM-DDTHH:MM:SS.ffffff±HH:MM` (profiler traces, event logs)
    Iso8601,
    /// `HH:MM:SS.fffffff AM` (process monitor), truncated to microseconds
    TimeOfDay,
    /// Caller-supplied chrono layout. Only applied on request, never inferred.
    Combined(String),
}

impl std::fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iso8601 => write!(f, "ISO 8601"),
            Self::TimeOfDay => write!(f, "time of day"),
            Self::Combined(layout) => write!(f, "'{layout}'"),
        }
    }
}

impl TimestampFormat {
    /// Whether `text` has the shape of this encoding
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Iso8601 => ISO_8601.is_match(text),
            Self::TimeOfDay => TIME_OF_DAY.is_match(text),
            Self::Combined(_) => false,
        }
    }

    /// Parse `text`, trying the documented fallback layouts in order.
    pub fn parse(&self, text: &str) -> Result<TypedValue, CoerceError> {
        let parsed = match self {
            Self::Iso8601 => parse_iso_8601(text),
            Self::TimeOfDay => parse_time_of_day(text),
            Self::Combined(layout) => NaiveDateTime::parse_from_str(text, layout)
                .ok()
                .map(TypedValue::LocalTimestamp),
        };
        parsed.ok_or_else(|| CoerceError::InvalidTimestamp {
            value: text.to_string(),
            format: self.to_string(),
        })
    }
}

fn parse_iso_8601(text: &str) -> Option<TypedValue> {
    let normalized = match text.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => text.to_string(),
    };
    ISO_8601_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(&normalized, layout).ok())
        .map(TypedValue::Timestamp)
}

fn parse_time_of_day(text: &str) -> Option<TypedValue> {
    if !TIME_OF_DAY.is_match(text) {
        return None;
    }
    // Drop the 7th sub-second digit: "…00.0554208 AM" -> "…00.055420 AM"
    let cut = text.len() - 4;
    let truncated = format!("{}{}", &text[..cut], &text[cut + 1..]);
    NaiveDateTime::parse_from_str(
        &format!("{TIME_OF_DAY_ANCHOR} {truncated}"),
        "%Y-%m-%d %I:%M:%S%.f %p",
    )
    .ok()
    .map(TypedValue::LocalTimestamp)
}

/// Error raised when text cannot take the type it was promised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    InvalidInteger { field: String, value: String },
    InvalidTimestamp { value: String, format: String },
}

impl std::fmt::Display for CoerceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInteger { field, value } => {
                write!(f, "field '{field}': '{value}' is not a valid integer")
            }
            Self::InvalidTimestamp { value, format } => {
                write!(f, "'{value}' is not a valid {format} timestamp")
            }
        }
    }
}

impl std::error::Error for CoerceError {}

/// One inference step: shape predicate plus parser.
///
/// A parser returning `Ok(None)` falls through to the next rule.
struct Rule {
    matches: fn(&Coercer, &str) -> bool,
    parse: fn(&Coercer, &str) -> Result<Option<TypedValue>, CoerceError>,
}

/// Inference rules in priority order
static RULES: [Rule; 3] = [
    Rule {
        matches: |_, text| INTEGER.is_match(text),
        // Out-of-range digit strings keep their text
        parse: |_, text| Ok(text.parse::<i64>().ok().map(TypedValue::Integer)),
    },
    Rule {
        matches: |_, text| DECIMAL.is_match(text),
        parse: |_, text| Ok(text.parse::<f64>().ok().map(TypedValue::Float)),
    },
    Rule {
        matches: |c, text| c.timestamps.matches(text),
        parse: |c, text| c.timestamps.parse(text).map(Some),
    },
];

/// Pattern-based value coercer for one source format.
#[derive(Debug, Clone)]
pub struct Coercer {
    timestamps: TimestampFormat,
}

impl Coercer {
    pub fn new(timestamps: TimestampFormat) -> Self {
        Self { timestamps }
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamps
    }

    /// Infer the type of `raw`; absent text is null.
    pub fn coerce(&self, raw: Option<&str>) -> Result<TypedValue, CoerceError> {
        let Some(text) = raw else {
            return Ok(TypedValue::Null);
        };
        for rule in RULES.iter() {
            if (rule.matches)(self, text) {
                if let Some(value) = (rule.parse)(self, text)? {
                    return Ok(value);
                }
            }
        }
        Ok(TypedValue::String(text.to_string()))
    }

    /// Parse `text` with this format's timestamp encoding regardless of shape.
    pub fn timestamp(&self, text: &str) -> Result<TypedValue, CoerceError> {
        self.timestamps.parse(text)
    }
}
