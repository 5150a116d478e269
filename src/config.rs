use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::SalonOpsError;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tabular store backend settings
    pub store: StoreConfig,
    /// Read-cache settings
    pub cache: CacheConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Export settings
    pub export: ExportConfig,
}

/// Tabular store backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite file backing the store
    pub path: String,
}

/// Read-cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the sled cache
    pub dir: String,
    /// Time-to-live of cached table reads, in seconds
    pub ttl_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format: "json" or "text"
    pub format: String,
    /// Optional log file; console-only when absent
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default export format (txt, csv or json)
    pub default_format: String,
    /// Directory exported files are written to
    pub output_directory: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig { path: "data/salon.db".to_string() },
            cache: CacheConfig { dir: ".salon_cache".to_string(), ttl_secs: 60 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
                file_path: None,
            },
            export: ExportConfig {
                default_format: "csv".to_string(),
                output_directory: "./output".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence: defaults,
    /// then config files, then `SALON_OPS__*` environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("store.path", defaults.store.path)?
            .set_default("cache.dir", defaults.cache.dir)?
            .set_default("cache.ttl_secs", defaults.cache.ttl_secs as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("export.default_format", defaults.export.default_format)?
            .set_default("export.output_directory", defaults.export.output_directory)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("SALON_OPS").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {e}"))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.store.path.trim().is_empty() {
            return Err(SalonOpsError::InvalidConfig(
                "store.path must not be empty".to_string(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(SalonOpsError::InvalidConfig(
                "cache.ttl_secs must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(SalonOpsError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                self.logging.level
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(SalonOpsError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {valid_formats:?}",
                self.logging.format
            )));
        }

        let valid_exports = ["txt", "csv", "json"];
        if !valid_exports.contains(&self.export.default_format.as_str()) {
            return Err(SalonOpsError::InvalidConfig(format!(
                "Invalid export format: {}. Must be one of: {valid_exports:?}",
                self.export.default_format
            )));
        }

        Ok(())
    }

    /// Get the store path from environment or config
    #[must_use]
    pub fn store_path(&self) -> String {
        std::env::var("SALON_DB_PATH").unwrap_or_else(|_| self.store.path.clone())
    }

    /// Get the log level from environment or config
    #[must_use]
    pub fn log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
