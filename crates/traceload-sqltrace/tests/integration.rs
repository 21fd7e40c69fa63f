//! Integration tests for traceload-sqltrace
//!
//! Full imports against the in-memory document store.

use std::io::Write;

use tempfile::NamedTempFile;
use traceload_core::{Document, MemoryStore, ProgressContext, RunOptions, TypedValue};
use traceload_sqltrace::{Config, load, load_file};

fn trace(events: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?>
<TraceData xmlns="http://tempuri.org/TracePersistence.xsd">
  <Header><TraceProvider name="Microsoft SQL Server" /></Header>
  <Events>
"#,
    );
    for i in 0..events {
        xml.push_str(&format!(
            r#"    <Event id="12" name="SQL:BatchCompleted">
      <Column id="1" name="TextData">exec sp_who {i}</Column>
      <Column id="13" name="Duration">{}</Column>
      <Column id="14" name="StartTime">2023-08-08T09:09:43.887-04:00</Column>
      <Column id="11" name="LoginName">0042</Column>
    </Event>
"#,
            i * 10
        ));
    }
    xml.push_str("  </Events>\n</TraceData>\n");
    xml
}

fn config(batch_size: usize) -> Config {
    Config {
        collection: "trace".into(),
        batch_size,
        ..Default::default()
    }
}

fn ids(docs: &[Document]) -> Vec<u64> {
    docs.iter().map(|d| d.id).collect()
}

#[test]
fn imports_every_event_in_order() {
    let store = MemoryStore::new();
    let summary = load(trace(25).as_bytes(), &store, &config(10), &ProgressContext::hidden())
        .expect("import should succeed");

    assert_eq!(summary.documents("trace"), Some(25));
    assert_eq!(store.insert_sizes("trace"), vec![10, 10, 5]);

    let docs = store.documents("trace");
    assert_eq!(ids(&docs), (0..25).collect::<Vec<_>>());
    assert_eq!(
        docs[3].get("event"),
        Some(&TypedValue::from("SQL:BatchCompleted"))
    );
    assert_eq!(docs[3].get("Duration").and_then(TypedValue::as_i64), Some(30));
    assert_eq!(docs[3].get("LoginName").and_then(TypedValue::as_str), Some("0042"));
}

#[test]
fn populated_collection_is_never_appended_to() {
    let store = MemoryStore::new();
    load(trace(3).as_bytes(), &store, &config(100), &ProgressContext::hidden()).unwrap();
    let second = load(trace(2).as_bytes(), &store, &config(100), &ProgressContext::hidden()).unwrap();

    let dest = &second.outputs[0].destination;
    assert!(dest.is_renamed());
    assert!(dest.collection.starts_with("trace-"));
    assert_eq!(store.documents("trace").len(), 3);
    assert_eq!(store.documents(&dest.collection).len(), 2);
}

#[test]
fn reset_replaces_previous_contents() {
    let store = MemoryStore::new();
    load(trace(3).as_bytes(), &store, &config(100), &ProgressContext::hidden()).unwrap();

    let reset = Config {
        run: RunOptions {
            reset: true,
            ..Default::default()
        },
        ..config(100)
    };
    let summary = load(trace(2).as_bytes(), &store, &reset, &ProgressContext::hidden()).unwrap();
    let dest = &summary.outputs[0].destination;
    assert!(!dest.is_renamed());
    assert_eq!(dest.cleared, 3);
    assert_eq!(ids(&store.documents("trace")), vec![0, 1]);
}

#[test]
fn missing_events_container_is_an_error() {
    let store = MemoryStore::new();
    let xml = "<TraceData><Header/></TraceData>";
    let err = load(xml.as_bytes(), &store, &config(10), &ProgressContext::hidden()).unwrap_err();
    assert!(err.to_string().contains("Events"));
}

#[test]
fn invalid_declared_integer_aborts_with_record_index() {
    let store = MemoryStore::new();
    let xml = r#"<TraceData><Events>
<Event name="a"><Column name="SPID">51</Column></Event>
<Event name="b"><Column name="SPID">fifty-two</Column></Event>
</Events></TraceData>"#;
    let err = load(xml.as_bytes(), &store, &config(10), &ProgressContext::hidden()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("event 1"), "{message}");
    assert!(message.contains("fifty-two"), "{message}");
}

#[test]
fn loads_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(trace(4).as_bytes()).unwrap();

    let store = MemoryStore::new();
    let summary = load_file(file.path(), &store, &config(10), &ProgressContext::hidden()).unwrap();
    assert_eq!(summary.total_documents(), 4);
}

#[test]
fn missing_file_is_an_error() {
    let store = MemoryStore::new();
    let result = load_file(
        "/nonexistent/trace.xml".as_ref(),
        &store,
        &config(10),
        &ProgressContext::hidden(),
    );
    assert!(result.is_err());
}
