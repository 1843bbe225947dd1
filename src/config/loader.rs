//! Configuration loader with environment variable expansion

use super::{ConfigError, TelemetryConfig};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load telemetry configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<TelemetryConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TelemetryConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
