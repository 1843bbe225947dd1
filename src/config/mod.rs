//! Configuration module for Chaintrace
//!
//! Handles loading and parsing of YAML telemetry configuration with support
//! for environment variable expansion and comprehensive validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
///
/// Variable names must start with a letter or underscore and contain only
/// uppercase letters, digits, and underscores.
fn expand_env_vars(s: &str) -> String {
    // Regex to capture ${VAR} or ${VAR:-default}
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]+))?\}").unwrap();
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let full_match = cap.get(0).unwrap();
        let var_name = cap.get(1).unwrap().as_str();

        // Append the text before the match
        result.push_str(&s[last_match..full_match.start()]);

        // Get value from env, or use default from regex
        let value = match std::env::var(var_name) {
            Ok(val) => val,
            Err(_) => {
                if let Some(default) = cap.get(2) {
                    default.as_str().to_string()
                } else {
                    // No env var and no default. Keep the original placeholder.
                    full_match.as_str().to_string()
                }
            }
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    // Append the rest of the string after the last match
    result.push_str(&s[last_match..]);

    result
}

/// Custom deserializer for strings with environment variable expansion.
///
/// This is used with serde's `deserialize_with` attribute to automatically
/// expand environment variables when deserializing configuration values.
fn deserialize_with_env<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(expand_env_vars(&s))
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Telemetry configuration
///
/// Controls whether tracing is active, how the service identifies itself in
/// exported spans, and how spans are sampled, batched, and exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Enable or disable tracing. Default: false
    #[serde(default)]
    pub enabled: bool,

    /// Service name for trace identification. Supports ${VAR} and ${VAR:-default} expansion.
    /// Default: "analyst-droid"
    #[serde(
        default = "default_service_name",
        deserialize_with = "deserialize_with_env"
    )]
    pub service_name: String,

    /// Service version reported in the trace resource
    #[serde(default = "default_service_version")]
    pub service_version: String,

    /// Service namespace reported in the trace resource
    #[serde(default = "default_service_namespace")]
    pub service_namespace: String,

    /// Deployment environment (falls back to the ENVIRONMENT variable)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Export finished spans to stdout as well (development/debugging)
    #[serde(default)]
    pub console_export: bool,

    /// OTLP exporter configuration
    #[serde(default)]
    pub otlp: OtlpConfig,

    /// Trace sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Batch span processor configuration
    #[serde(default)]
    pub batch: BatchConfig,
}

fn default_service_name() -> String {
    "analyst-droid".to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_service_namespace() -> String {
    "blockchain-analysis".to_string()
}

fn default_environment() -> String {
    std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: default_service_name(),
            service_version: default_service_version(),
            service_namespace: default_service_namespace(),
            environment: default_environment(),
            console_export: false,
            otlp: OtlpConfig::default(),
            sampling: SamplingConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Build configuration from the service's environment variables.
    ///
    /// Honors `OTEL_TRACE_ENABLED`, `OTLP_EXPORTER_ENDPOINT`, and
    /// `OTEL_TRACE_CONSOLE`; everything else takes its default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.enabled = env_flag("OTEL_TRACE_ENABLED");
        config.console_export = env_flag("OTEL_TRACE_CONSOLE");
        if let Ok(endpoint) = std::env::var("OTLP_EXPORTER_ENDPOINT") {
            config.otlp.endpoint = endpoint;
        }
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        // Validate OTLP endpoint URL
        if !is_valid_http_url(&self.otlp.endpoint) {
            return Err(ConfigError::ValidationError(
                "Invalid OTLP endpoint: must start with http:// or https://".into(),
            ));
        }

        // Validate service name is not empty
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Service name cannot be empty when tracing is enabled".into(),
            ));
        }

        // Validate sampling strategy
        match self.sampling.strategy.as_str() {
            "always" | "never" => {}
            "ratio" => {
                if !(0.0..=1.0).contains(&self.sampling.ratio) {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid sampling ratio {}: must be between 0.0 and 1.0",
                        self.sampling.ratio
                    )));
                }
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid sampling strategy '{}': must be 'always', 'never', or 'ratio'",
                    other
                )))
            }
        }

        if self.batch.max_export_batch_size > self.batch.max_queue_size {
            return Err(ConfigError::ValidationError(
                "Batch max_export_batch_size cannot exceed max_queue_size".into(),
            ));
        }

        Ok(())
    }
}

/// OTLP (OpenTelemetry Protocol) exporter configuration.
///
/// Configures how traces are exported to an OTLP-compatible backend
/// (Jaeger, Tempo, or any OTLP collector).
///
/// # Example
///
/// ```yaml
/// otlp:
///   endpoint: "${OTLP_EXPORTER_ENDPOINT:-http://localhost:4317}"
///   timeout_seconds: 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtlpConfig {
    /// Exporter endpoint. Supports ${VAR} and ${VAR:-default} expansion.
    #[serde(
        default = "default_otlp_endpoint",
        deserialize_with = "deserialize_with_env"
    )]
    pub endpoint: String,

    /// Export request timeout in seconds
    #[serde(default = "default_otlp_timeout")]
    pub timeout_seconds: u64,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otlp_timeout() -> u64 {
    10
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            endpoint: default_otlp_endpoint(),
            timeout_seconds: default_otlp_timeout(),
        }
    }
}

/// Trace sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sampling strategy: "always", "never", or "ratio"
    #[serde(default = "default_sampling_strategy")]
    pub strategy: String,

    /// Sampling ratio in [0.0, 1.0], used by the "ratio" strategy
    #[serde(default = "default_sampling_ratio")]
    pub ratio: f64,
}

fn default_sampling_strategy() -> String {
    "always".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            strategy: default_sampling_strategy(),
            ratio: default_sampling_ratio(),
        }
    }
}

/// Batch span processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of spans queued before drops occur
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Delay between consecutive batch exports, in milliseconds
    #[serde(default = "default_scheduled_delay_millis")]
    pub scheduled_delay_millis: u64,

    /// Maximum number of spans per export batch
    #[serde(default = "default_max_export_batch_size")]
    pub max_export_batch_size: usize,
}

fn default_max_queue_size() -> usize {
    2048
}

fn default_scheduled_delay_millis() -> u64 {
    5000
}

fn default_max_export_batch_size() -> usize {
    512
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_queue_size: default_max_queue_size(),
            scheduled_delay_millis: default_scheduled_delay_millis(),
            max_export_batch_size: default_max_export_batch_size(),
        }
    }
}
