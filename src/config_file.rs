//! Configuration file handling for the driver-selection tool.
//!
//! The config names where the settings store lives, which driver values may
//! be selected, and the predetermined defaults to fold in on `init`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SelectionError};
use crate::selection::Predetermined;
use crate::types::{DriverValue, is_valid_package_name};

/// Default store directory, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = "driver-settings";

/// Predetermined packages for one driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredeterminedGroup {
    pub driver: DriverValue,
    #[serde(default)]
    pub packages: Vec<String>,
}

/// Tool configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Directory backing the settings store
    pub store_dir: PathBuf,
    /// Values a package may be switched to; must include `default`
    pub driver_values: Vec<DriverValue>,
    /// Applied in order on `init`; first group listing a package wins
    pub predetermined: Vec<PredeterminedGroup>,
    /// Driver the system image forces on every app, if any
    pub system_driver: Option<DriverValue>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            driver_values: DriverValue::builtin(),
            predetermined: Vec::new(),
            system_driver: None,
        }
    }
}

impl SelectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            SelectionError::config(format!(
                "failed to read configuration from {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.driver_values.contains(&DriverValue::Default) {
            return Err(SelectionError::config(
                "driver_values must contain 'default'",
            ));
        }

        let mut seen = HashSet::new();
        for value in &self.driver_values {
            if !seen.insert(value) {
                return Err(SelectionError::config(format!(
                    "driver value '{}' is listed twice",
                    value
                )));
            }
        }

        for group in &self.predetermined {
            if !self.driver_values.contains(&group.driver) {
                return Err(SelectionError::config(format!(
                    "predetermined driver '{}' is not in driver_values",
                    group.driver
                )));
            }
            if let Some(bad) = group.packages.iter().find(|p| !is_valid_package_name(p)) {
                return Err(SelectionError::config(format!(
                    "invalid predetermined package name '{}'",
                    bad
                )));
            }
        }

        if let Some(driver) = &self.system_driver {
            if driver.is_default() {
                return Err(SelectionError::config(
                    "system_driver cannot be 'default'",
                ));
            }
        }

        Ok(())
    }

    /// Predetermined groups in application order
    pub fn predetermined(&self) -> Predetermined {
        let mut predetermined = Predetermined::new();
        for group in &self.predetermined {
            predetermined.add(group.driver.clone(), group.packages.iter().cloned());
        }
        predetermined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config() -> SelectionConfig {
        SelectionConfig {
            store_dir: PathBuf::from("/tmp/driver-settings"),
            predetermined: vec![
                PredeterminedGroup {
                    driver: DriverValue::Angle,
                    packages: vec!["com.example.game".to_string()],
                },
                PredeterminedGroup {
                    driver: DriverValue::Native,
                    packages: vec!["com.example.legacy".to_string()],
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SelectionConfig::default();
        assert_eq!(config.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
        assert_eq!(config.driver_values, DriverValue::builtin());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_roundtrip_save_load() {
        let original = create_test_config();
        let temp_file = NamedTempFile::new().unwrap();

        original.save_to_file(temp_file.path()).unwrap();
        let loaded = SelectionConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{"store_dir": "/var/lib/drivers"}"#)
            .unwrap();
        temp_file.flush().unwrap();

        let config = SelectionConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/var/lib/drivers"));
        assert_eq!(config.driver_values, DriverValue::builtin());
        assert!(config.predetermined.is_empty());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SelectionConfig::load_from_file("/nonexistent/path.json");
        assert!(matches!(result, Err(SelectionError::Config(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        let result = SelectionConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(SelectionError::Json(_))));
    }

    #[test]
    fn test_load_rejects_bad_driver_token() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{"driver_values": ["default", "a,b"]}"#)
            .unwrap();
        temp_file.flush().unwrap();

        assert!(SelectionConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_validation_requires_default() {
        let config = SelectionConfig {
            driver_values: vec![DriverValue::Angle, DriverValue::Native],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicates() {
        let config = SelectionConfig {
            driver_values: vec![DriverValue::Default, DriverValue::Angle, DriverValue::Angle],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_predetermined_driver() {
        let mut config = create_test_config();
        config.predetermined.push(PredeterminedGroup {
            driver: DriverValue::Other("vk".to_string()),
            packages: vec!["com.a".to_string()],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_package() {
        let mut config = create_test_config();
        config.predetermined[0].packages.push("com.a,com.b".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_default_system_driver() {
        let config = SelectionConfig {
            system_driver: Some(DriverValue::Default),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_predetermined_keeps_group_order() {
        let config = create_test_config();
        let predetermined = config.predetermined();
        let drivers: Vec<&DriverValue> = predetermined.groups().map(|(d, _)| d).collect();
        assert_eq!(drivers, vec![&DriverValue::Angle, &DriverValue::Native]);
    }
}
