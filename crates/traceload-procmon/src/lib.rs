//! Traceload Procmon - Process Monitor XML exports
//!
//! A Procmon export holds two independent record lists: `<processlist>`
//! (one `<process>` per process seen) and `<eventlist>` (one `<event>` per
//! captured operation, often millions). They are written to two collections,
//! `processes` and `events`, each with its own id sequence.

pub mod config;
pub mod parser;
pub mod runner;

// Re-exports
pub use config::Config;
pub use runner::{load, load_file};
