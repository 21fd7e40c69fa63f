//! Event log adapter configuration

use traceload_core::{FieldOverrides, RunOptions};

/// Runtime configuration for one Event Viewer import
#[derive(Debug, Clone)]
pub struct Config {
    pub collection: String,
    /// Events per insert; 1 writes every event individually
    pub batch_size: usize,
    pub run: RunOptions,
    pub fields: FieldOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: "eventlog".to_string(),
            batch_size: 1,
            run: RunOptions::default(),
            fields: FieldOverrides::default(),
        }
    }
}
