//! Span facade tests
//!
//! Verifies the wrap semantics against an in-memory exporter: values and
//! errors pass through unchanged, spans close exactly once with the right
//! terminal status, and sync/async wrapping produce identical outcomes.

mod common;

use chaintrace::taxonomy::{keys, ERROR_EVENT};
use chaintrace::{traced, traced_async};
use opentelemetry::trace::Status;
use opentelemetry::KeyValue;
use opentelemetry_sdk::export::trace::SpanData;
use serial_test::serial;

fn attribute_value<'a>(span: &'a SpanData, key: &str) -> Option<&'a opentelemetry::Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

#[test]
#[serial]
fn test_traced_ok_returns_value_and_closes_ok() {
    let capture = common::install_memory_exporter();

    let result: Result<i32, String> = traced(
        "fraud_detection",
        vec![KeyValue::new(keys::FRAUD_TYPE, "wash_trading")],
        || Ok(7),
    );
    assert_eq!(result, Ok(7));

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, "fraud_detection");
    assert_eq!(span.status, Status::Ok);
    assert_eq!(
        attribute_value(span, keys::FRAUD_TYPE).unwrap().as_str(),
        "wash_trading"
    );
}

#[test]
#[serial]
fn test_traced_err_passes_error_through_and_closes_error() {
    let capture = common::install_memory_exporter();

    // Spec scenario: wrap a failing operation under span name "x"
    let result: Result<i32, String> = traced("x", vec![], || Err("bad".to_string()));
    assert_eq!(result, Err("bad".to_string()));

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, "x");
    match &span.status {
        Status::Error { description } => assert_eq!(description, "bad"),
        other => panic!("expected error status, got {:?}", other),
    }

    // Exactly one recorded error event with the original message
    let events: Vec<_> = span
        .events
        .iter()
        .filter(|event| event.name == ERROR_EVENT)
        .collect();
    assert_eq!(events.len(), 1);
    let message = events[0]
        .attributes
        .iter()
        .find(|kv| kv.key.as_str() == keys::EXCEPTION_MESSAGE)
        .map(|kv| kv.value.as_str().to_string());
    assert_eq!(message.as_deref(), Some("bad"));
}

#[tokio::test]
#[serial]
async fn test_traced_async_matches_sync_outcomes() {
    let capture = common::install_memory_exporter();

    let ok: Result<i32, String> = traced_async(
        "fraud_detection",
        vec![KeyValue::new(keys::FRAUD_TYPE, "wash_trading")],
        async { Ok(7) },
    )
    .await;
    assert_eq!(ok, Ok(7));

    let err: Result<i32, String> =
        traced_async("x", vec![], async { Err("bad".to_string()) }).await;
    assert_eq!(err, Err("bad".to_string()));

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 2);

    let ok_span = spans.iter().find(|s| s.name == "fraud_detection").unwrap();
    assert_eq!(ok_span.status, Status::Ok);
    assert_eq!(
        attribute_value(ok_span, keys::FRAUD_TYPE).unwrap().as_str(),
        "wash_trading"
    );

    let err_span = spans.iter().find(|s| s.name == "x").unwrap();
    match &err_span.status {
        Status::Error { description } => assert_eq!(description, "bad"),
        other => panic!("expected error status, got {:?}", other),
    }
    assert_eq!(err_span.events.len(), 1);
}

#[test]
#[serial]
fn test_nested_traced_parents_correctly() {
    let capture = common::install_memory_exporter();

    let result: Result<i32, String> = traced("outer", vec![], || {
        traced("inner", vec![], || Ok(1))
    });
    assert_eq!(result, Ok(1));

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 2);
    let outer = spans.iter().find(|s| s.name == "outer").unwrap();
    let inner = spans.iter().find(|s| s.name == "inner").unwrap();
    assert_eq!(inner.parent_span_id, outer.span_context.span_id());
}

#[tokio::test]
#[serial]
async fn test_async_context_stays_current_across_awaits() {
    let capture = common::install_memory_exporter();

    let result: Result<(), String> = traced_async("outer_async", vec![], async {
        tokio::task::yield_now().await;
        // The outer span must still be current after resumption
        chaintrace::tag_current(KeyValue::new("resumed", true));
        traced_async("inner_async", vec![], async { Ok(()) }).await
    })
    .await;
    assert_eq!(result, Ok(()));

    let spans = capture.finished_spans();
    let outer = spans.iter().find(|s| s.name == "outer_async").unwrap();
    let inner = spans.iter().find(|s| s.name == "inner_async").unwrap();
    assert_eq!(inner.parent_span_id, outer.span_context.span_id());
    assert_eq!(
        attribute_value(outer, "resumed"),
        Some(&opentelemetry::Value::Bool(true))
    );
}

#[test]
#[serial]
fn test_mark_error_and_event_land_on_open_span() {
    let capture = common::install_memory_exporter();

    let result: Result<i32, String> = traced("degraded_op", vec![], || {
        chaintrace::event_current("checkpoint", vec![KeyValue::new("stage", "load")]);
        chaintrace::mark_error(&"stale price feed");
        // Marking must not close the span
        assert!(capture.finished_spans().is_empty());
        assert!(chaintrace::current_span_context().is_some());
        Ok(3)
    });
    assert_eq!(result, Ok(3));

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert!(span.events.iter().any(|event| event.name == "checkpoint"));
    let exception = span
        .events
        .iter()
        .find(|event| event.name == ERROR_EVENT)
        .expect("error event recorded");
    let message = exception
        .attributes
        .iter()
        .find(|kv| kv.key.as_str() == keys::EXCEPTION_MESSAGE)
        .map(|kv| kv.value.as_str().to_string());
    assert_eq!(message.as_deref(), Some("stale price feed"));
}

#[test]
#[serial]
fn test_cancelled_future_still_closes_span() {
    let capture = common::install_memory_exporter();

    let fut = traced_async("cancelled_op", vec![], async {
        std::future::pending::<()>().await;
        Ok::<i32, String>(1)
    });
    let mut task = tokio_test::task::spawn(fut);
    assert!(task.poll().is_pending());
    drop(task);

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 1);
    match &spans[0].status {
        Status::Error { description } => {
            assert_eq!(description, "cancelled before span completion")
        }
        other => panic!("expected error status, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_panicking_operation_still_closes_span() {
    let capture = common::install_memory_exporter();

    let outcome = std::panic::catch_unwind(|| {
        let _: Result<(), String> = traced("panicky", vec![], || panic!("kaboom"));
    });
    assert!(outcome.is_err());

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, "panicky");
    assert!(matches!(spans[0].status, Status::Error { .. }));
}
