//! Integration tests for the configuration module

use std::fs;

use dogmail_core::animation::SequenceVariant;
use dogmail_core::utils::config::{Config, StorageBackend};
use tempfile::TempDir;

#[test]
fn test_config_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("test_config.yaml");

    let mut original_config = Config::default();
    original_config.server.port = 4321;
    original_config.server.storage = StorageBackend::Memory;
    original_config.client.api_url = "https://treats.example.com".to_string();
    original_config.animation.variant = SequenceVariant::Feast;

    original_config.save_to_file(&config_path)?;

    assert!(config_path.exists());
    let file_content = fs::read_to_string(&config_path)?;
    assert!(file_content.contains("memory"));
    assert!(file_content.contains("feast"));

    let loaded_config = Config::load_from_file(&config_path)?;

    assert_eq!(loaded_config.server.port, 4321);
    assert_eq!(loaded_config.server.storage, StorageBackend::Memory);
    assert_eq!(loaded_config.client.api_url, "https://treats.example.com");
    assert_eq!(loaded_config.animation.variant, SequenceVariant::Feast);

    Ok(())
}

#[test]
fn test_invalid_yaml_reports_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("broken.yaml");
    fs::write(&config_path, "server: [not, a, map")?;

    let err = Config::load_from_file(&config_path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"));

    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::load_from_file(temp_dir.path().join("nope.yaml"));
    assert!(result.is_err());
}
