//! Event Viewer `<Event>` → document fields

use anyhow::{Context, Result};
use traceload_core::xml::Element;
use traceload_core::{Coercer, FieldCoercer, Fields, TypedValue};

/// Container holding the exported events
pub const EVENTS: &str = "Events";

const SYSTEM: &str = "System";
const EVENT_DATA: &str = "EventData";

/// Convert one `<Event>` into its sectioned document.
pub fn event_fields(event: &Element, coercer: &FieldCoercer) -> Result<Fields> {
    let mut fields = Fields::new();
    for section in &event.children {
        let value = match section.name.as_str() {
            SYSTEM => system_fields(section, coercer),
            EVENT_DATA => Ok(event_data_fields(section)),
            _ => section_fields(section, coercer.coercer()),
        }
        .with_context(|| format!("<{}> section", section.name))?;
        fields.insert(section.name.as_str(), TypedValue::Map(value));
    }
    Ok(fields)
}

/// `<System>`: text children coerced, attribute-only children as maps.
fn system_fields(system: &Element, coercer: &FieldCoercer) -> Result<Fields> {
    let mut fields = Fields::new();
    for child in &system.children {
        match child.text() {
            Some(text) => {
                let value = coercer.coerce_field(&child.name, Some(strip_namespace(text)))?;
                fields.insert(child.name.as_str(), value);
                // <EventID Qualifiers="16384">7036</EventID>
                for (attr, raw) in &child.attributes {
                    let key = format!("{}_{attr}", child.name);
                    let value = coercer.coerce_field(&key, Some(raw.as_str()))?;
                    fields.insert(key, value);
                }
            }
            None if child.attributes.is_empty() => fields.insert(child.name.as_str(), TypedValue::Null),
            None => {
                let attrs = attribute_fields(child, coercer)?;
                fields.insert(child.name.as_str(), TypedValue::Map(attrs));
            }
        }
    }
    Ok(fields)
}

/// `<EventData>`: raw `<Data>` texts keyed by their `Name` attribute.
///
/// Classic-provider events carry unnamed `<Data>` entries; those are keyed
/// `Data`, `Data1`, `Data2`, ... in order.
fn event_data_fields(data: &Element) -> Fields {
    let mut fields = Fields::new();
    let mut unnamed = 0usize;
    for child in &data.children {
        let key = match (child.name.as_str(), child.attribute("Name")) {
            (_, Some(name)) => name.to_string(),
            ("Data", None) => {
                let key = match unnamed {
                    0 => "Data".to_string(),
                    n => format!("Data{n}"),
                };
                unnamed += 1;
                key
            }
            (tag, None) => tag.to_string(),
        };
        let value = child.text().map_or(TypedValue::Null, TypedValue::from);
        fields.insert(key, value);
    }
    fields
}

/// Any other section: attributes plus leaves by inference, nested
/// elements as maps, repeated tags collected into arrays.
///
/// Rendered sections reuse System names (`Level`, `Task`) for display
/// text, so declared types do not apply here.
fn section_fields(section: &Element, coercer: &Coercer) -> Result<Fields> {
    let mut fields = Fields::new();
    for (name, raw) in &section.attributes {
        fields.insert(name.as_str(), coercer.coerce(Some(raw.as_str()))?);
    }
    let mut grouped: Vec<(&str, Vec<TypedValue>)> = Vec::new();
    for child in &section.children {
        let value = if child.is_leaf() && child.attributes.is_empty() {
            coercer.coerce(child.text())?
        } else {
            TypedValue::Map(section_fields(child, coercer)?)
        };
        match grouped.iter_mut().find(|(name, _)| *name == child.name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((child.name.as_str(), vec![value])),
        }
    }
    for (name, mut values) in grouped {
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            TypedValue::Array(values)
        };
        fields.insert(name, value);
    }
    if let Some(text) = section.text() {
        fields.insert("text", coercer.coerce(Some(text))?);
    }
    Ok(fields)
}

fn attribute_fields(element: &Element, coercer: &FieldCoercer) -> Result<Fields> {
    let mut fields = Fields::new();
    for (name, raw) in &element.attributes {
        fields.insert(name.as_str(), coercer.coerce_field(name, Some(raw.as_str()))?);
    }
    Ok(fields)
}

/// Drop a leading `{namespace}` qualifier from a value.
///
/// A value that is entirely braced (a GUID) is kept as-is.
fn strip_namespace(text: &str) -> &str {
    if !text.starts_with('{') {
        return text;
    }
    match text.find('}') {
        Some(end) if end + 1 < text.len() => &text[end + 1..],
        _ => text,
    }
}
