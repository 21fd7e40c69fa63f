//! Procmon adapter configuration

use traceload_core::{FieldOverrides, OutputSpec, RunOptions};

/// Runtime configuration for one Procmon import
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination for `<processlist>` entries
    pub processes: OutputSpec,
    /// Destination for `<eventlist>` entries
    pub events: OutputSpec,
    pub run: RunOptions,
    pub fields: FieldOverrides,
}

impl Config {
    /// Override both batch sizes
    pub fn with_batch_sizes(mut self, processes: usize, events: usize) -> Self {
        self.processes.batch_size = processes;
        self.events.batch_size = events;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processes: OutputSpec::new("processes", 100).announced(),
            events: OutputSpec::new("events", 50_000).announced(),
            run: RunOptions::default(),
            fields: FieldOverrides::default(),
        }
    }
}
