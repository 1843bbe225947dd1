//! Span facade: uniform wrapping, scoped spans, and current-span utilities
//!
//! Every span opened here is closed with a terminal status on every exit
//! path, exactly once: `Ok` results close OK, `Err` results close ERROR
//! with the error recorded as an event and the error value passed through
//! unchanged, and abandoned spans (panic, async cancellation) are closed
//! ERROR by the guard's `Drop`. When telemetry is inactive every operation
//! degrades to a no-op; instrumentation must never change the observable
//! behavior of the code it wraps.
//!
//! Async wrapping carries the span context through OpenTelemetry's
//! future-attached context, so the span stays current across suspension
//! points within one logical call chain without bleeding into concurrently
//! scheduled tasks.

use crate::init::telemetry_active;
use crate::taxonomy::{keys, ERROR_EVENT};
use opentelemetry::trace::{FutureExt, SpanContext, SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{global, Context, ContextGuard, KeyValue};
use std::borrow::Cow;
use std::fmt;
use std::future::Future;

/// Start a span and return a context carrying it.
fn start_context(name: Cow<'static, str>, kind: SpanKind, attributes: Vec<KeyValue>) -> Context {
    let tracer = global::tracer(crate::TRACER_NAME);
    let span = tracer
        .span_builder(name)
        .with_kind(kind)
        .with_attributes(attributes)
        .start(&tracer);
    Context::current_with_span(span)
}

/// Closes the carried span exactly once, with an error status if the guard
/// is dropped before an explicit close (panic or cancelled future).
struct SpanGuard {
    cx: Context,
    closed: bool,
}

impl SpanGuard {
    fn new(cx: Context) -> Self {
        Self { cx, closed: false }
    }

    fn close_ok(&mut self) {
        if self.closed {
            return;
        }
        let span = self.cx.span();
        span.set_status(Status::Ok);
        span.end();
        self.closed = true;
    }

    fn close_err(&mut self, message: &str) {
        if self.closed {
            return;
        }
        let span = self.cx.span();
        span.add_event(
            ERROR_EVENT,
            vec![KeyValue::new(keys::EXCEPTION_MESSAGE, message.to_string())],
        );
        span.set_status(Status::error(message.to_string()));
        span.end();
        self.closed = true;
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if std::thread::panicking() {
            self.close_err("panicked before span completion");
        } else {
            self.close_err("cancelled before span completion");
        }
    }
}

/// Run a fallible operation inside a new span.
///
/// Opens a span, makes it current for the duration of `f`, and closes it
/// from the returned `Result`: `Ok` → status OK, `Err` → status ERROR with
/// the error message recorded as an `exception` event. The result passes
/// through unchanged either way. When telemetry is inactive, `f` runs bare.
///
/// # Example
///
/// ```
/// use chaintrace::{taxonomy::names, traced};
///
/// let score: Result<f64, String> = traced(names::FRAUD_DETECTION, vec![], || Ok(0.87));
/// assert_eq!(score, Ok(0.87));
/// ```
pub fn traced<T, E, F>(
    name: impl Into<Cow<'static, str>>,
    attributes: Vec<KeyValue>,
    f: F,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: fmt::Display,
{
    if !telemetry_active() {
        return f();
    }

    let cx = start_context(name.into(), SpanKind::Internal, attributes);
    let mut guard = SpanGuard::new(cx.clone());
    let result = {
        let _attached = cx.attach();
        f()
    };
    match &result {
        Ok(_) => guard.close_ok(),
        Err(e) => guard.close_err(&e.to_string()),
    }
    result
}

/// Async counterpart of [`traced`] with identical span semantics.
///
/// The span context rides on the future itself, so it is restored on every
/// poll and never leaks into unrelated tasks. If the future is dropped
/// before completion (cancellation), the span still closes, with an ERROR
/// status.
pub async fn traced_async<T, E, F>(
    name: impl Into<Cow<'static, str>>,
    attributes: Vec<KeyValue>,
    fut: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    if !telemetry_active() {
        return fut.await;
    }

    let cx = start_context(name.into(), SpanKind::Internal, attributes);
    let mut guard = SpanGuard::new(cx.clone());
    let result = fut.with_context(cx).await;
    match &result {
        Ok(_) => guard.close_ok(),
        Err(e) => guard.close_err(&e.to_string()),
    }
    result
}

/// Scoped span with guaranteed closure on every exit path.
///
/// While the handle is alive its span is the current span; further
/// attributes and events can be added through the handle. On drop the span
/// closes exactly once: ERROR if the thread is panicking or [`fail`] was
/// called, OK otherwise.
///
/// Intended for synchronous scopes; async code should use [`traced_async`].
///
/// [`fail`]: ScopedSpan::fail
///
/// # Example
///
/// ```
/// use chaintrace::{scoped_span, taxonomy::names};
/// use opentelemetry::KeyValue;
///
/// {
///     let span = scoped_span(names::GRAPH_ANALYSIS);
///     span.set_attribute(KeyValue::new("blockchain.chain_id", 1_i64));
///     // span closes OK here
/// }
/// ```
pub struct ScopedSpan {
    guard: SpanGuard,
    failure: Option<String>,
    _attached: Option<ContextGuard>,
}

impl ScopedSpan {
    fn enter(name: Cow<'static, str>, kind: SpanKind, attributes: Vec<KeyValue>) -> Self {
        if !telemetry_active() {
            // Inert handle: holds no span and leaves the current context
            // untouched, so it can never mutate or close a span it did not
            // open. Every operation on it is a no-op.
            let mut guard = SpanGuard::new(Context::new());
            guard.closed = true;
            return Self {
                guard,
                failure: None,
                _attached: None,
            };
        }

        let cx = start_context(name, kind, attributes);
        let attached = cx.clone().attach();
        Self {
            guard: SpanGuard::new(cx),
            failure: None,
            _attached: Some(attached),
        }
    }

    /// Add an attribute to the span.
    pub fn set_attribute(&self, attribute: KeyValue) {
        self.guard.cx.span().set_attribute(attribute);
    }

    /// Add a timestamped event to the span.
    pub fn add_event(&self, name: impl Into<Cow<'static, str>>, attributes: Vec<KeyValue>) {
        self.guard.cx.span().add_event(name, attributes);
    }

    /// Mark the scope as failed; the span will close with ERROR status and
    /// the error recorded. Control flow is untouched.
    pub fn fail(&mut self, error: &dyn fmt::Display) {
        self.failure = Some(error.to_string());
    }
}

impl Drop for ScopedSpan {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.guard.close_err("panicked inside scoped span");
        } else if let Some(message) = self.failure.take() {
            self.guard.close_err(&message);
        } else {
            self.guard.close_ok();
        }
        // self.guard's own Drop is now a no-op; _attached detaches last
    }
}

/// Open a scoped span with INTERNAL kind and no initial attributes.
pub fn scoped_span(name: impl Into<Cow<'static, str>>) -> ScopedSpan {
    ScopedSpan::enter(name.into(), SpanKind::Internal, Vec::new())
}

/// Open a scoped span with an explicit kind and initial attributes.
pub fn scoped_span_with(
    name: impl Into<Cow<'static, str>>,
    kind: SpanKind,
    attributes: Vec<KeyValue>,
) -> ScopedSpan {
    ScopedSpan::enter(name.into(), kind, attributes)
}

/// Span context of the current active span, or `None` when no span is
/// active or telemetry is inactive. Never panics.
pub fn current_span_context() -> Option<SpanContext> {
    let cx = Context::current();
    if cx.has_active_span() {
        Some(cx.span().span_context().clone())
    } else {
        None
    }
}

/// Add an attribute to the current span, if one is recording.
///
/// Safe to call unconditionally from any code path.
pub fn tag_current(attribute: KeyValue) {
    let cx = Context::current();
    let span = cx.span();
    if span.is_recording() {
        span.set_attribute(attribute);
    }
}

/// Add an event to the current span, if one is recording.
pub fn event_current(name: impl Into<Cow<'static, str>>, attributes: Vec<KeyValue>) {
    let cx = Context::current();
    let span = cx.span();
    if span.is_recording() {
        span.add_event(name, attributes);
    }
}

/// Mark the current span as failed without closing it or altering control
/// flow. Sets ERROR status and records the error as an event. No-op when no
/// span is recording.
pub fn mark_error(error: &dyn fmt::Display) {
    let cx = Context::current();
    let span = cx.span();
    if span.is_recording() {
        let message = error.to_string();
        span.add_event(
            ERROR_EVENT,
            vec![KeyValue::new(keys::EXCEPTION_MESSAGE, message.clone())],
        );
        span.set_status(Status::error(message));
    }
}
