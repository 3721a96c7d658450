//! Configuration Management

use crate::pattern::matcher::MatchingConfig;
use crate::pattern::validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Pattern library location
    pub library: LibraryConfig,
    /// Composite matching weights
    pub matching: MatchingConfig,
    /// Reliability thresholds
    pub validation: ValidationConfig,
}

/// Pattern library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Path of the library file commands operate on
    pub path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: dirs::home_dir()
                .map(|h| h.join(".pattern_trainer").join("library.json"))
                .unwrap_or_else(|| PathBuf::from("library.json")),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns the first invalid field as a Config error.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.matching.validate()?;

        let validation = &self.validation;
        if !(0.0..=1.0).contains(&validation.high_success_ratio) {
            return Err(crate::Error::Config(format!(
                "high_success_ratio must be in [0, 1], got {}",
                validation.high_success_ratio
            )));
        }
        if !(0.0..=1.0).contains(&validation.unreliable_success_ratio) {
            return Err(crate::Error::Config(format!(
                "unreliable_success_ratio must be in [0, 1], got {}",
                validation.unreliable_success_ratio
            )));
        }
        if validation.unreliable_success_ratio > validation.high_success_ratio {
            return Err(crate::Error::Config(format!(
                "unreliable_success_ratio ({}) exceeds high_success_ratio ({})",
                validation.unreliable_success_ratio, validation.high_success_ratio
            )));
        }
        if validation.max_age_days <= 0 {
            return Err(crate::Error::Config(format!(
                "max_age_days must be > 0, got {}",
                validation.max_age_days
            )));
        }
        if validation.high_usage_count == 0 {
            return Err(crate::Error::Config(
                "high_usage_count must be > 0".to_string(),
            ));
        }
        if validation.high_confidence < 0.0 {
            return Err(crate::Error::Config(format!(
                "high_confidence must be >= 0, got {}",
                validation.high_confidence
            )));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location, falling back to defaults when
    /// no file exists
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".pattern_trainer").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
