//! Outbound HTTP call annotation
//!
//! Hooks for HTTP client instrumentation: call these around outbound
//! requests to tag the current span with the detected API provider and
//! response metadata. All annotation happens on the current span and is a
//! no-op when nothing is recording, so the hooks are safe to wire
//! unconditionally into any client.

use crate::provider::detect_provider;
use crate::taxonomy::keys;
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{Context, KeyValue};

/// HTTP status code for rate-limited responses
const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Annotate the current span with the provider an outbound request targets.
///
/// Detects the provider from the URL; on a match, tags `api.provider` and
/// renames the span to the provider-specific span name. A detection miss
/// leaves the span untouched.
pub fn annotate_outbound_request(url: &str) {
    let Some(provider) = detect_provider(url) else {
        return;
    };

    let cx = Context::current();
    let span = cx.span();
    if span.is_recording() {
        span.set_attribute(KeyValue::new(keys::API_PROVIDER, provider.as_str()));
        span.update_name(provider.span_name());
    }
}

/// Annotate the current span with outbound response metadata.
///
/// Records the status code; on 429 additionally tags `api.rate_limited`
/// and, when the `Retry-After` header value is supplied, `api.retry_after`.
pub fn annotate_outbound_response(status_code: u16, retry_after: Option<&str>) {
    let cx = Context::current();
    let span = cx.span();
    if !span.is_recording() {
        return;
    }

    span.set_attribute(KeyValue::new(keys::API_STATUS_CODE, status_code as i64));

    if status_code == STATUS_TOO_MANY_REQUESTS {
        span.set_attribute(KeyValue::new(keys::API_RATE_LIMITED, true));
        if let Some(retry_after) = retry_after {
            span.set_attribute(KeyValue::new(keys::API_RETRY_AFTER, retry_after.to_string()));
        }
    }
}
