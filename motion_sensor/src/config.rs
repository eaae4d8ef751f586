// THEORY:
// Configuration is a small TOML document split by concern: `[detection]` selects the
// starting sensitivity and the working space of the difference reduction, and
// `[logging]` carries the default log filter for binaries that install a subscriber.
// Every field has a default, so an empty file is a valid configuration. Unknown keys
// are rejected instead of being silently ignored.

use crate::core_modules::pixel::pixel::WorkingSpace;
use crate::core_modules::sensitivity::SensitivityLevel;
use serde::Deserialize;
use std::path::Path;

/// Runtime configuration, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectionConfig {
    #[serde(default)]
    pub sensitivity: SensitivityLevel,
    #[serde(default)]
    pub working_space: WorkingSpace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MotionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

fn default_log_level() -> String {
    "info".into()
}
