//! Traceload SQL Trace - SQL Server Profiler XML traces
//!
//! Each `<Event>` under `<Events>` becomes one document: the event name
//! under `event`, then one field per `<Column>` keyed by its `name`.
//!
//! # Example
//!
//! ```ignore
//! use traceload_core::{MemoryStore, ProgressContext};
//! use traceload_sqltrace::{Config, load_file};
//!
//! let store = MemoryStore::new();
//! let summary = load_file("trace.xml".as_ref(), &store, &Config::default(), &ProgressContext::hidden())?;
//! println!("Inserted {} events", summary.total_documents());
//! ```

pub mod config;
pub mod parser;
pub mod runner;

// Re-exports
pub use config::Config;
pub use runner::{load, load_file};
