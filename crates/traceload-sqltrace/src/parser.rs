//! Profiler event → document fields

use anyhow::{Context, Result, bail};
use traceload_core::xml::Element;
use traceload_core::{FieldCoercer, Fields, TypedValue};

/// Container holding the trace events
pub const EVENTS: &str = "Events";

/// Convert one `<Event name=..>` and its `<Column name=..>` children.
pub fn event_fields(event: &Element, coercer: &FieldCoercer) -> Result<Fields> {
    let Some(name) = event.attribute("name") else {
        bail!("<{}> has no name attribute", event.name);
    };

    let mut fields = Fields::new();
    fields.insert("event", TypedValue::from(name));
    for column in &event.children {
        let Some(column_name) = column.attribute("name") else {
            bail!("<{}> in event {name} has no name attribute", column.name);
        };
        let value = coercer
            .coerce_field(column_name, column.text())
            .with_context(|| format!("column {column_name} of event {name}"))?;
        fields.insert(column_name, value);
    }
    Ok(fields)
}
