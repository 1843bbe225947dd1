//! OpenTelemetry tracer initialization and lifecycle management
//!
//! This module handles the one-time initialization of the OpenTelemetry
//! tracer provider, OTLP exporter configuration, and graceful shutdown with
//! span flushing. Initialization flips a process-wide "telemetry active"
//! flag that the span facade reads; the flag is set once at startup and
//! never mutated at steady state.
//!
//! Exporter and propagator setup is best-effort: a failing step is recorded
//! in the [`SetupReport`] and logged at WARN, but never fails the caller.
//! This keeps setup misconfiguration distinguishable from the facade's
//! steady-state no-ops when telemetry is simply disabled.

use crate::config::TelemetryConfig;
use lazy_static::lazy_static;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{BatchConfig, BatchSpanProcessor, Sampler, Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::taxonomy::keys;

/// Errors that can occur during telemetry initialization
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid OTLP endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to initialize OTLP exporter: {0}")]
    ExporterError(String),

    #[error("Failed to initialize tracer provider: {0}")]
    ProviderError(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Outcome of a single best-effort setup step.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupOutcome {
    Succeeded,
    Failed(String),
}

/// One entry in the setup report.
#[derive(Debug, Clone)]
pub struct SetupEntry {
    pub step: &'static str,
    pub outcome: SetupOutcome,
}

/// Report of all best-effort setup steps from the most recent initialization.
pub type SetupReport = Vec<SetupEntry>;

static TELEMETRY_ACTIVE: AtomicBool = AtomicBool::new(false);

lazy_static! {
    static ref SETUP_REPORT: RwLock<SetupReport> = RwLock::new(Vec::new());
}

/// Whether telemetry was initialized and is currently active.
///
/// Read by the span facade on every operation; when false, all facade
/// operations degrade to no-ops.
#[inline]
pub fn telemetry_active() -> bool {
    TELEMETRY_ACTIVE.load(Ordering::Relaxed)
}

/// Setup outcomes recorded by the most recent [`init_telemetry`] call.
///
/// Empty when telemetry was never initialized or was initialized disabled.
pub fn setup_report() -> SetupReport {
    SETUP_REPORT.read().clone()
}

fn record_setup(step: &'static str, outcome: SetupOutcome) {
    if let SetupOutcome::Failed(ref message) = outcome {
        warn!(step, error = %message, "telemetry setup step failed");
    }
    SETUP_REPORT.write().push(SetupEntry { step, outcome });
}

/// Mark telemetry active without running full initialization.
///
/// Intended for tests that install their own tracer provider.
#[doc(hidden)]
pub fn activate_for_testing() {
    TELEMETRY_ACTIVE.store(true, Ordering::SeqCst);
}

/// Counterpart of [`activate_for_testing`] for no-op degradation tests.
#[doc(hidden)]
pub fn deactivate_for_testing() {
    TELEMETRY_ACTIVE.store(false, Ordering::SeqCst);
}

/// RAII guard for telemetry lifecycle management
///
/// Automatically flushes and shuts down the tracer provider when dropped.
/// This ensures that all pending spans are exported before the application
/// exits.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<Arc<TracerProvider>>,
    active: bool,
}

impl TelemetryGuard {
    /// Create a new guard with an active tracer provider
    fn new(provider: TracerProvider) -> Self {
        Self {
            provider: Some(Arc::new(provider)),
            active: true,
        }
    }

    /// Create an inactive guard (when telemetry is disabled)
    fn inactive() -> Self {
        Self {
            provider: None,
            active: false,
        }
    }

    /// Check if telemetry is active
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Tracer handle from the owned provider, if any.
    ///
    /// Used to wire the tracing-opentelemetry subscriber layer.
    pub fn tracer(&self) -> Option<Tracer> {
        self.provider
            .as_ref()
            .map(|provider| provider.tracer(crate::TRACER_NAME))
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if self.active {
            // Force flush all pending spans before shutdown
            if let Some(provider) = &self.provider {
                let _ = provider.force_flush();
            }
            // Shutdown the global tracer provider
            global::shutdown_tracer_provider();
            TELEMETRY_ACTIVE.store(false, Ordering::SeqCst);
        }
    }
}

fn build_resource(config: &TelemetryConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new(keys::SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(keys::SERVICE_VERSION, config.service_version.clone()),
        KeyValue::new(keys::SERVICE_NAMESPACE, config.service_namespace.clone()),
        KeyValue::new(keys::DEPLOYMENT_ENVIRONMENT, config.environment.clone()),
    ])
}

fn build_sampler(config: &TelemetryConfig) -> Sampler {
    match config.sampling.strategy.as_str() {
        "never" => Sampler::AlwaysOff,
        "ratio" => Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            config.sampling.ratio,
        ))),
        // "always", plus anything validate() already rejected
        _ => Sampler::AlwaysOn,
    }
}

fn build_batch_config(config: &TelemetryConfig) -> BatchConfig {
    BatchConfig::default()
        .with_max_queue_size(config.batch.max_queue_size)
        .with_scheduled_delay(Duration::from_millis(config.batch.scheduled_delay_millis))
        .with_max_export_batch_size(config.batch.max_export_batch_size)
}

/// Initialize OpenTelemetry tracing with the given configuration
///
/// Sets up the trace resource, sampler, OTLP batch exporter, optional
/// console exporter, and the W3C trace-context propagator, then installs
/// the tracer provider globally and marks telemetry active. Returns a
/// [`TelemetryGuard`] that will flush and shut tracing down when dropped.
///
/// Requires a Tokio runtime when tracing is enabled (the batch span
/// processor exports on it).
///
/// # Arguments
///
/// * `config` - Telemetry configuration including OTLP endpoint and sampling settings
///
/// # Returns
///
/// * `Ok(TelemetryGuard)` - Guard that manages the telemetry lifecycle
/// * `Err(TelemetryError)` - If the configuration is unusable
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // If telemetry is disabled, return inactive guard
    if !config.enabled {
        return Ok(TelemetryGuard::inactive());
    }

    // Validate endpoint format
    let endpoint = &config.otlp.endpoint;
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(TelemetryError::InvalidEndpoint(format!(
            "Endpoint must start with http:// or https://, got: {}",
            endpoint
        )));
    }

    SETUP_REPORT.write().clear();

    let mut builder = TracerProvider::builder().with_config(
        opentelemetry_sdk::trace::Config::default()
            .with_resource(build_resource(config))
            .with_sampler(build_sampler(config)),
    );

    // OTLP exporter (Jaeger, Tempo, any OTLP collector). Best-effort: a
    // construction failure is reported and logged, never propagated.
    match opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint.clone())
        .with_timeout(Duration::from_secs(config.otlp.timeout_seconds))
        .build_span_exporter()
    {
        Ok(exporter) => {
            let processor = BatchSpanProcessor::builder(exporter, runtime::Tokio)
                .with_batch_config(build_batch_config(config))
                .build();
            builder = builder.with_span_processor(processor);
            record_setup("otlp_exporter", SetupOutcome::Succeeded);
        }
        Err(e) => {
            record_setup("otlp_exporter", SetupOutcome::Failed(e.to_string()));
        }
    }

    // Console exporter (development/debugging)
    if config.console_export {
        builder = builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default());
        record_setup("console_exporter", SetupOutcome::Succeeded);
    }

    let provider = builder.build();

    // Set as global provider and configure distributed-trace propagation
    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());
    record_setup("propagator", SetupOutcome::Succeeded);

    TELEMETRY_ACTIVE.store(true, Ordering::SeqCst);
    info!(
        service = %config.service_name,
        version = %config.service_version,
        endpoint = %endpoint,
        "telemetry initialized"
    );

    Ok(TelemetryGuard::new(provider))
}

/// Explicitly shutdown telemetry and flush all pending spans
///
/// This is called automatically when `TelemetryGuard` is dropped, but can
/// be called explicitly for more control over the shutdown process.
pub fn shutdown_telemetry(mut guard: TelemetryGuard) -> Result<(), TelemetryError> {
    if guard.active {
        // Force flush all pending spans
        if let Some(provider) = &guard.provider {
            for result in provider.force_flush() {
                result.map_err(|e| TelemetryError::ProviderError(e.to_string()))?;
            }
        }
        // Mark as inactive to prevent double shutdown in Drop
        guard.active = false;
        // Shutdown global provider
        global::shutdown_tracer_provider();
        TELEMETRY_ACTIVE.store(false, Ordering::SeqCst);
    }
    Ok(())
}
