//! Procmon `<process>` / `<event>` → document fields
//!
//! Leaf sub-elements become fields keyed by tag. Nested lists such as
//! `<modulelist>` or `<stack>` become arrays; each item is either a coerced
//! leaf or a map of the item's own sub-elements.

use anyhow::{Context, Result};
use traceload_core::xml::Element;
use traceload_core::{FieldCoercer, Fields, TypedValue};

/// Container of process entries
pub const PROCESS_LIST: &str = "processlist";
/// Container of captured events
pub const EVENT_LIST: &str = "eventlist";

/// Convert one process or event record.
pub fn record_fields(record: &Element, coercer: &FieldCoercer) -> Result<Fields> {
    let mut fields = Fields::new();
    for child in &record.children {
        let value = element_value(child, coercer)
            .with_context(|| format!("<{}> in <{}>", child.name, record.name))?;
        fields.insert(child.name.as_str(), value);
    }
    Ok(fields)
}

fn element_value(element: &Element, coercer: &FieldCoercer) -> Result<TypedValue> {
    if element.is_leaf() {
        return Ok(coercer.coerce_field(&element.name, element.text())?);
    }
    let items = element
        .children
        .iter()
        .map(|item| {
            if item.is_leaf() {
                Ok(coercer.coerce_field(&item.name, item.text())?)
            } else {
                record_fields(item, coercer).map(TypedValue::Map)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TypedValue::Array(items))
}
