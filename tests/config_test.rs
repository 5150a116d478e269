//! Tests for configuration loading and validation

use salon_ops::config::AppConfig;

#[test]
fn test_default_values() {
    let config = AppConfig::default();
    assert_eq!(config.store.path, "data/salon.db");
    assert_eq!(config.cache.dir, ".salon_cache");
    assert_eq!(config.cache.ttl_secs, 60);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.export.default_format, "csv");
}

#[test]
fn test_defaults_validate() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_empty_store_path_is_rejected() {
    let mut config = AppConfig::default();
    config.store.path = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_ttl_is_rejected() {
    let mut config = AppConfig::default();
    config.cache.ttl_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_log_format_is_rejected() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_export_format_is_rejected() {
    let mut config = AppConfig::default();
    config.export.default_format = "xlsx".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_store_path_falls_back_to_config() {
    // SALON_DB_PATH is not set in the test environment
    let mut config = AppConfig::default();
    config.store.path = "elsewhere/salon.db".to_string();
    if std::env::var("SALON_DB_PATH").is_err() {
        assert_eq!(config.store_path(), "elsewhere/salon.db");
    }
}
