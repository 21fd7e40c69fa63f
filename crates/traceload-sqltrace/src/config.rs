//! SQL trace adapter configuration

use traceload_core::{FieldOverrides, RunOptions};

/// Runtime configuration for one profiler trace import
#[derive(Debug, Clone)]
pub struct Config {
    /// Requested destination collection
    pub collection: String,
    /// Events per bulk insert
    pub batch_size: usize,
    pub run: RunOptions,
    /// Extra field classifications from the configuration file
    pub fields: FieldOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: "trace".to_string(),
            batch_size: 10_000,
            run: RunOptions::default(),
            fields: FieldOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.collection, "trace");
        assert_eq!(config.batch_size, 10_000);
        assert!(!config.run.reset);
        assert!(config.fields.integers.is_empty());
    }
}
