//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use traceload_core::{FieldOverrides, RetryPolicy};
use traceload_weblog::Layout;

/// Connection string used when neither the file nor `--mongodb` names one
pub const DEFAULT_URI: &str = "mongodb://localhost";

/// Global configuration for traceload
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub batch: BatchConfig,
    pub retry: RetryConfig,
    pub weblog: WeblogConfig,
    pub fields: FieldsConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// May reference an environment variable as `${VAR}`
    #[serde(deserialize_with = "deserialize_env_var")]
    pub uri: Option<String>,
}

impl StoreConfig {
    pub fn uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(DEFAULT_URI)
    }
}

/// Documents per bulk insert, per destination
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub sql: usize,
    pub processes: usize,
    pub events: usize,
    pub eventlog: usize,
    pub weblog: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sql: 10_000,
            processes: 100,
            events: 50_000,
            eventlog: 1,
            weblog: 50_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeblogConfig {
    pub timestamp_format: String,
    /// Replaces the built-in IIS field list
    pub iis_fields: Option<Vec<String>>,
    /// Replaces the built-in HTTPERR field list
    pub httperr_fields: Option<Vec<String>>,
}

impl Default for WeblogConfig {
    fn default() -> Self {
        Self {
            timestamp_format: traceload_weblog::layout::DEFAULT_TIMESTAMP_FORMAT.to_string(),
            iis_fields: None,
            httperr_fields: None,
        }
    }
}

impl WeblogConfig {
    pub fn iis(&self) -> Layout {
        self.layout(Layout::iis(), self.iis_fields.as_ref())
    }

    pub fn httperr(&self) -> Layout {
        self.layout(Layout::httperr(), self.httperr_fields.as_ref())
    }

    fn layout(&self, builtin: Layout, fields: Option<&Vec<String>>) -> Layout {
        let fields = fields.cloned().unwrap_or(builtin.fields);
        Layout::new(fields, self.timestamp_format.clone())
    }
}

/// Extra field classifications per source format
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FieldsConfig {
    pub sql: FieldList,
    pub procmon: FieldList,
    pub eventlog: FieldList,
    pub weblog: FieldList,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FieldList {
    pub strings: Vec<String>,
    pub integers: Vec<String>,
    pub timestamps: Vec<String>,
}

impl FieldList {
    pub fn overrides(&self) -> FieldOverrides {
        FieldOverrides {
            strings: self.strings.clone(),
            integers: self.integers.clone(),
            timestamps: self.timestamps.clone(),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration, `explicit` first.
    ///
    /// Search order:
    /// 1. `--config PATH`
    /// 2. ./traceload.toml (current directory)
    /// 3. ~/.config/traceload/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local_config = PathBuf::from("traceload.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "traceload") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
