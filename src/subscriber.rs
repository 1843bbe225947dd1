//! Tracing subscriber setup with layered architecture
//!
//! This module provides a layered subscriber that combines multiple tracing layers:
//! - **OpenTelemetry layer**: Exports spans to the OTLP collector (when enabled)
//! - **Fmt layer**: Outputs logs to console/stdout
//! - **EnvFilter**: Controls log levels via RUST_LOG environment variable
//!
//! # Layer Architecture
//!
//! When telemetry is enabled:
//! ```text
//! Registry
//!   ├── OpenTelemetry Layer (exports to OTLP)
//!   ├── EnvFilter (RUST_LOG)
//!   └── Fmt Layer (console output)
//! ```
//!
//! When telemetry is disabled:
//! ```text
//! Registry
//!   ├── EnvFilter (RUST_LOG)
//!   └── Fmt Layer (console output)
//! ```

use crate::config::TelemetryConfig;
use crate::init::{init_telemetry, TelemetryError, TelemetryGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with layered architecture
///
/// Sets up a subscriber that combines:
/// - OpenTelemetry layer (when telemetry is enabled)
/// - Fmt layer for console output
/// - EnvFilter for log level control (respects RUST_LOG)
///
/// # Arguments
///
/// * `config` - Telemetry configuration
///
/// # Returns
///
/// * `Ok(TelemetryGuard)` - Guard that manages the telemetry lifecycle
/// * `Err(TelemetryError)` - If initialization fails
///
/// # Example
///
/// ```no_run
/// use chaintrace::config::TelemetryConfig;
/// use chaintrace::subscriber::init_subscriber;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TelemetryConfig::from_env();
/// let _guard = init_subscriber(&config)?;
/// // Subscriber is now active, spans will be exported to OTLP
/// # Ok(())
/// # }
/// ```
pub fn init_subscriber(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Initialize the OpenTelemetry tracer provider
    let guard = init_telemetry(config)?;

    // Create EnvFilter from RUST_LOG or default to INFO
    // This allows users to control log levels via environment variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Default to INFO level if RUST_LOG is not set
        EnvFilter::new("info")
    });

    if let Some(tracer) = guard.tracer() {
        // When telemetry is enabled, combine OpenTelemetry + Fmt layers
        // The OpenTelemetry layer bridges tracing spans into the provider
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        // Create fmt layer with target information for better debugging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);

        let subscriber = tracing_subscriber::registry()
            .with(telemetry_layer)
            .with(env_filter)
            .with(fmt_layer);

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            TelemetryError::SubscriberError(format!(
                "Failed to set global subscriber (may already be initialized): {}",
                e
            ))
        })?;
    } else {
        // When telemetry is disabled, only use Fmt layer for console output
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer);

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            TelemetryError::SubscriberError(format!(
                "Failed to set global subscriber (may already be initialized): {}",
                e
            ))
        })?;
    }

    Ok(guard)
}
