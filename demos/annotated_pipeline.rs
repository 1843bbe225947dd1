//! End-to-end demo of the telemetry facade.
//!
//! Initializes the layered subscriber with console export, then runs a
//! small annotated analysis pipeline: an external API call with provider
//! detection, a graph database query, and a fraud-detection pass.
//!
//! Run with:
//! ```text
//! OTEL_TRACE_ENABLED=true OTEL_TRACE_CONSOLE=true cargo run --example annotated_pipeline
//! ```

use anyhow::Result;
use chaintrace::builders::{AgentTask, ApiCall, DbOperation, FraudDetection};
use chaintrace::http::{annotate_outbound_request, annotate_outbound_response};
use chaintrace::provider::ApiProvider;
use chaintrace::taxonomy::{keys, names};
use chaintrace::{init_subscriber, scoped_span, shutdown_telemetry, tag_current, TelemetryConfig};
use opentelemetry::KeyValue;

async fn fetch_wallet_balances(wallet: &str) -> Result<u32, String> {
    let url = format!("https://deep-index.moralis.io/api/v2.2/wallets/{wallet}");
    annotate_outbound_request(&url);
    // Pretend we made the request
    annotate_outbound_response(200, None);
    Ok(17)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = TelemetryConfig::from_env();
    config.console_export = true;
    let guard = init_subscriber(&config)?;

    let wallet = "0x7c3a9b5e4d2f1a8c6b0e9d8f7a6b5c4d3e2f1a0b";

    // External API call with provider detection
    let balances = ApiCall::new(ApiProvider::Moralis, "/api/v2.2/wallets")
        .with_method("GET")
        .run_async(fetch_wallet_balances(wallet))
        .await
        .map_err(anyhow::Error::msg)?;
    tracing::info!(balances, "fetched wallet balances");

    // Graph database query
    let neighbors: Vec<String> = DbOperation::new("neo4j", "query")
        .with_db_name("graph")
        .run(|| Ok::<_, String>(vec!["0xdef".to_string()]))
        .map_err(anyhow::Error::msg)?;
    tracing::info!(count = neighbors.len(), "expanded transaction graph");

    // Agent-driven fraud detection with a manually annotated scope
    let score = AgentTask::new("fraud_crew", "pattern_analyst", "scoring")
        .run_async(async {
            FraudDetection::new("wash_trading")
                .with_wallet_address(wallet)
                .run_async(async {
                    let span = scoped_span(names::GRAPH_ANALYSIS);
                    span.set_attribute(KeyValue::new(keys::CHAIN_ID, 1_i64));
                    span.add_event("cycle_detected", vec![KeyValue::new("length", 4_i64)]);
                    drop(span);

                    tag_current(KeyValue::new(keys::FRAUD_SCORE, 0.87));
                    Ok::<f64, String>(0.87)
                })
                .await
        })
        .await
        .map_err(anyhow::Error::msg)?;
    tracing::info!(score, "fraud scoring complete");

    shutdown_telemetry(guard)?;
    Ok(())
}
