//! W3C log line → document fields

use anyhow::{Context, Result, bail};
use traceload_core::{FieldCoercer, Fields, TypedValue};

use crate::layout::{Layout, TIMESTAMP_FIELD};

/// W3C placeholder for an empty field.
///
/// Stored as null for every field, declared strings included: the log
/// writes `-` where it has no value, never as a value.
const EMPTY: &str = "-";

/// Parse one log line; `None` for comment and blank lines.
pub fn line_fields(line: &str, layout: &Layout, coercer: &FieldCoercer) -> Result<Option<Fields>> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(None);
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [date, time, rest @ ..] = tokens.as_slice() else {
        bail!("expected date and time, found {:?}", line.trim());
    };

    let mut fields = Fields::new();
    let timestamp = coercer
        .coercer()
        .timestamp(&format!("{date}{time}"))
        .with_context(|| format!("timestamp '{date} {time}'"))?;
    fields.insert(TIMESTAMP_FIELD, timestamp);

    for (i, token) in rest.iter().enumerate() {
        let name = layout.field_name(i + 2);
        let value = if *token == EMPTY {
            TypedValue::Null
        } else {
            coercer.coerce_field(&name, Some(*token))?
        };
        fields.insert(name, value);
    }
    Ok(Some(fields))
}
