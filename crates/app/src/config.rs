use serde::{Deserialize, Serialize};
use std::path::Path;
use tabsplit_core::SplitConfig;
use tabsplit_ocr::{ExtractorConfig, PipelineConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// All tunables, loaded from a TOML file. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extract: ExtractorConfig,
    pub split: SplitConfig,
    pub pipeline: PipelineConfig,
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.extract.default_tax_rate.is_sign_negative() {
            return Err(ConfigError::Invalid("extract.default_tax_rate must not be negative".into()));
        }
        if !(0.0..=1.0).contains(&self.pipeline.min_confidence) {
            return Err(ConfigError::Invalid("pipeline.min_confidence must be within 0.0–1.0".into()));
        }
        Ok(())
    }
}
