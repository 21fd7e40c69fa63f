//! Traceload Event Log - Windows Event Viewer XML exports
//!
//! Every `<Event>` under `<Events>` becomes one document with a `System`
//! sub-document, an `EventData` sub-document of raw `<Data>` texts, and one
//! sub-document per remaining section (`UserData`, `RenderingInfo`).

pub mod config;
pub mod parser;
pub mod runner;

// Re-exports
pub use config::Config;
pub use runner::{load, load_file};
