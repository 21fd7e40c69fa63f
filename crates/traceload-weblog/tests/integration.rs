//! Integration tests for traceload-weblog

use std::io::Write;

use tempfile::NamedTempFile;
use traceload_core::{MemoryStore, ProgressContext, TypedValue};
use traceload_weblog::{Config, Layout, load, load_file};

const IIS_HEADER: &str = "#Software: Microsoft Internet Information Services 10.0\n\
#Version: 1.0\n\
#Date: 2023-08-08 13:00:00\n\
#Fields: date time s-ip cs-method cs-uri-stem cs-uri-query s-port cs-username c-ip cs(User-Agent) cs(Referer) sc-status sc-substatus sc-win32-status time-taken\n";

fn iis_log(lines: usize) -> String {
    let mut log = String::from(IIS_HEADER);
    for i in 0..lines {
        log.push_str(&format!(
            "2023-08-08 13:{:02}:{:02} 10.0.0.5 GET /page{i}.html - 443 - 192.168.1.{} Mozilla/5.0 - 200 0 0 {}\r\n",
            (i / 60) % 60,
            i % 60,
            i % 250,
            i % 1000
        ));
    }
    log
}

fn config(batch_size: usize) -> Config {
    Config {
        collection: "weblog".into(),
        batch_size,
        ..Default::default()
    }
}

#[test]
fn imports_lines_and_skips_headers() {
    let store = MemoryStore::new();
    let summary = load(iis_log(12).as_bytes(), &store, &config(5), &ProgressContext::hidden())
        .expect("import should succeed");

    assert_eq!(summary.documents("weblog"), Some(12));
    assert_eq!(store.insert_sizes("weblog"), vec![5, 5, 2]);

    let docs = store.documents("weblog");
    assert!(docs.iter().map(|d| d.id).eq(0..12));
    assert_eq!(docs[7].get("cs-uri-stem").and_then(TypedValue::as_str), Some("/page7.html"));
    assert_eq!(docs[7].get("time-taken").and_then(TypedValue::as_i64), Some(7));
    assert!(matches!(docs[7].get("timestamp"), Some(TypedValue::LocalTimestamp(_))));
}

#[test]
fn checkpoints_every_batch() {
    let store = MemoryStore::new();
    let summary = load(iis_log(120).as_bytes(), &store, &config(40), &ProgressContext::hidden()).unwrap();
    assert_eq!(store.insert_sizes("weblog"), vec![40, 40, 40]);
    assert_eq!(summary.outputs[0].stats.flushes, 4);
}

#[test]
fn httperr_layout() {
    let log = "#Software: Microsoft HTTP API 2.0\n\
#Fields: date time c-ip c-port s-ip s-port cs-version cs-method cs-uri streamid sc-status s-siteid s-reason s-queuename\n\
2023-08-08 13:10:01 192.168.1.20 51234 10.0.0.5 80 HTTP/1.1 GET /bad - 400 - BadRequest -\n\
\n\
2023-08-08 13:10:02 192.168.1.21 51240 10.0.0.5 443 - - - - - - Timer_ConnectionIdle -\n";
    let store = MemoryStore::new();
    let config = Config {
        collection: "httperr".into(),
        layout: Layout::httperr(),
        ..Default::default()
    };
    load(log.as_bytes(), &store, &config, &ProgressContext::hidden()).unwrap();

    let docs = store.documents("httperr");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].get("s-reason").and_then(TypedValue::as_str), Some("Timer_ConnectionIdle"));
    assert!(docs[1].get("sc-status").is_some_and(TypedValue::is_null));
}

#[test]
fn malformed_line_reports_line_number() {
    let log = format!("{IIS_HEADER}2023-08-08 13:09:43 10.0.0.5 GET\nbroken\n");
    let store = MemoryStore::new();
    let err = load(log.as_bytes(), &store, &config(10), &ProgressContext::hidden()).unwrap_err();
    assert!(format!("{err:#}").contains("line 6"));
}

#[test]
fn loads_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(iis_log(3).as_bytes()).unwrap();

    let store = MemoryStore::new();
    let summary = load_file(file.path(), &store, &config(10), &ProgressContext::hidden()).unwrap();
    assert_eq!(summary.total_documents(), 3);
}
