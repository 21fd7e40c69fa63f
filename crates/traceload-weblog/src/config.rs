//! Web log adapter configuration

use traceload_core::{FieldOverrides, RunOptions};

use crate::layout::Layout;

/// Runtime configuration for one web log import
#[derive(Debug, Clone)]
pub struct Config {
    pub collection: String,
    /// Lines per bulk insert
    pub batch_size: usize,
    pub layout: Layout,
    pub run: RunOptions,
    pub fields: FieldOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: "weblog".to_string(),
            batch_size: 50_000,
            layout: Layout::iis(),
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
        assert_eq!(config.batch_size, 50_000);
        assert_eq!(config.layout, Layout::iis());
    }
}
