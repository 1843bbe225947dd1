//! Shared test helpers
//!
//! Installs an in-memory span exporter as the global tracer provider so
//! tests can assert on finished span names, attributes, statuses, and
//! events. The simple processor exports on a background thread, so reads go
//! through [`SpanCapture::finished_spans`], which flushes the provider
//! first. Tests using this helper mutate process-global state and must be
//! marked `#[serial]`.

use opentelemetry::global;
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;

/// Handle to the installed in-memory exporter and its provider.
pub struct SpanCapture {
    provider: TracerProvider,
    exporter: InMemorySpanExporter,
}

impl SpanCapture {
    /// Flush pending spans and return everything exported so far.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        for result in self.provider.force_flush() {
            result.expect("span flush failed");
        }
        self.exporter.get_finished_spans().expect("exported spans")
    }
}

/// Install a fresh in-memory exporter as the global tracer provider and
/// mark telemetry active.
pub fn install_memory_exporter() -> SpanCapture {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    global::set_tracer_provider(provider.clone());
    chaintrace::init::activate_for_testing();
    SpanCapture { provider, exporter }
}
