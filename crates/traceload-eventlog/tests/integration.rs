//! Integration tests for traceload-eventlog

use std::io::Write;

use tempfile::NamedTempFile;
use traceload_core::{MemoryStore, ProgressContext, TypedValue};
use traceload_eventlog::{Config, load, load_file};

fn export(events: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Events>\n");
    for i in 0..events {
        xml.push_str(&format!(
            "<Event xmlns='http://schemas.microsoft.com/win/2004/08/events/event'>\
             <System><Provider Name='Service Control Manager'/><EventID Qualifiers='16384'>7036</EventID>\
             <Level>4</Level><TimeCreated SystemTime='2023-08-08T13:09:{:02}.000Z'/>\
             <EventRecordID>{}</EventRecordID><Channel>System</Channel></System>\
             <EventData><Data Name='param1'>Windows Update</Data><Data Name='param2'>running</Data></EventData>\
             </Event>\n",
            i % 60,
            9000 + i
        ));
    }
    xml.push_str("</Events>\n");
    xml
}

#[test]
fn inserts_each_event_individually() {
    let store = MemoryStore::new();
    let summary = load(export(5).as_bytes(), &store, &Config::default(), &ProgressContext::hidden())
        .expect("import should succeed");

    assert_eq!(summary.documents("eventlog"), Some(5));
    assert_eq!(store.insert_sizes("eventlog"), vec![1; 5]);

    let docs = store.documents("eventlog");
    assert!(docs.iter().map(|d| d.id).eq(0..5));

    let system = docs[2].get("System").and_then(TypedValue::as_map).unwrap();
    assert_eq!(system.get("EventRecordID").and_then(TypedValue::as_i64), Some(9002));
    let data = docs[2].get("EventData").and_then(TypedValue::as_map).unwrap();
    assert_eq!(data.get("param2").and_then(TypedValue::as_str), Some("running"));
}

#[test]
fn batch_size_is_configurable() {
    let store = MemoryStore::new();
    let config = Config {
        batch_size: 2,
        ..Default::default()
    };
    load(export(5).as_bytes(), &store, &config, &ProgressContext::hidden()).unwrap();
    assert_eq!(store.insert_sizes("eventlog"), vec![2, 2, 1]);
}

#[test]
fn empty_export_writes_nothing() {
    let store = MemoryStore::new();
    let summary = load("<Events></Events>".as_bytes(), &store, &Config::default(), &ProgressContext::hidden())
        .unwrap();
    assert_eq!(summary.total_documents(), 0);
    assert!(store.collection_names().is_empty());
}

#[test]
fn unterminated_export_is_an_error() {
    let store = MemoryStore::new();
    let xml = "<Events><Event><System><EventID>1</EventID>";
    assert!(load(xml.as_bytes(), &store, &Config::default(), &ProgressContext::hidden()).is_err());
}

#[test]
fn loads_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(export(3).as_bytes()).unwrap();

    let store = MemoryStore::new();
    let summary = load_file(file.path(), &store, &Config::default(), &ProgressContext::hidden()).unwrap();
    assert_eq!(summary.total_documents(), 3);
}
