//! Chaintrace Library
//!
//! Telemetry facade for blockchain-analysis services. Owns the span-naming
//! and attribute-key taxonomy, API provider detection for outbound HTTP
//! calls, and a uniform instrumentation surface with standardized status
//! and error recording on top of OpenTelemetry.
//!
//! # Features
//!
//! - **Closed Taxonomy**: Fixed catalogs of span names and attribute keys
//! - **Provider Detection**: Pure URL-to-provider matching (sim, covalent, moralis, gemini)
//! - **Uniform Wrapping**: `traced`/`traced_async` with identical span semantics
//! - **Guaranteed Closure**: Every facade-opened span closes on every exit path
//! - **Transparent Degrade**: All operations are no-ops when telemetry is inactive
//!
//! # Example
//!
//! ```no_run
//! use chaintrace::{init_subscriber, traced, TelemetryConfig};
//!
//! fn lookup_wallet(address: &str) -> Result<u64, String> {
//!     Ok(address.len() as u64)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chaintrace::TelemetryError> {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_subscriber(&config)?;
//!
//!     let balance = traced("graph_analysis", vec![], || lookup_wallet("0xabc"));
//!     let _ = balance;
//!     Ok(())
//! }
//! ```

pub mod builders;
pub mod config;
pub mod http;
pub mod init;
pub mod provider;
pub mod span;
pub mod subscriber;
pub mod taxonomy;

// Re-export commonly used types
pub use config::{ConfigError, TelemetryConfig};
pub use init::{init_telemetry, shutdown_telemetry, TelemetryError, TelemetryGuard};
pub use provider::{detect_provider, ApiProvider};
pub use span::{
    current_span_context, event_current, mark_error, scoped_span, scoped_span_with, tag_current,
    traced, traced_async, ScopedSpan,
};
pub use subscriber::init_subscriber;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Instrumentation scope name reported to the tracer provider
pub const TRACER_NAME: &str = "chaintrace";
