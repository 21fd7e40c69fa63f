//! Traceload Web Log - W3C space-separated server logs
//!
//! Supports IIS access logs and HTTP.sys error logs (HTTPERR). Each data
//! line starts with `date time`; the remaining tokens are mapped onto a
//! [`Layout`]'s field names.

pub mod config;
pub mod layout;
pub mod parser;
pub mod runner;

// Re-exports
pub use config::Config;
pub use layout::Layout;
pub use runner::{load, load_file};
