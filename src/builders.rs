//! Domain span builders
//!
//! Declarative mappings from typed domain parameters to span names and
//! attribute sets, thin over the span facade. Each builder only assembles
//! attributes; status and error semantics come entirely from
//! [`traced`](crate::span::traced) / [`traced_async`](crate::span::traced_async).

use crate::provider::ApiProvider;
use crate::span::{traced, traced_async};
use crate::taxonomy::{keys, names};
use opentelemetry::KeyValue;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;

/// External API call: `{provider}_api_call` with provider/endpoint/method.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub provider: ApiProvider,
    pub endpoint: String,
    pub method: String,
}

impl ApiCall {
    pub fn new(provider: ApiProvider, endpoint: impl Into<String>) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
            method: "GET".to_string(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn span_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.provider.span_name())
    }

    pub fn attributes(&self) -> Vec<KeyValue> {
        vec![
            KeyValue::new(keys::API_PROVIDER, self.provider.as_str()),
            KeyValue::new(keys::API_ENDPOINT, self.endpoint.clone()),
            KeyValue::new(keys::API_METHOD, self.method.clone()),
        ]
    }

    pub fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        traced(self.span_name(), self.attributes(), f)
    }

    pub async fn run_async<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        traced_async(self.span_name(), self.attributes(), fut).await
    }
}

/// Database operation: `{system}_{operation}` with db.system/operation/name.
#[derive(Debug, Clone)]
pub struct DbOperation {
    pub system: String,
    pub operation: String,
    pub db_name: Option<String>,
}

impl DbOperation {
    pub fn new(system: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            operation: operation.into(),
            db_name: None,
        }
    }

    pub fn with_db_name(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    pub fn span_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}_{}", self.system, self.operation))
    }

    pub fn attributes(&self) -> Vec<KeyValue> {
        let mut attributes = vec![
            KeyValue::new(keys::DB_SYSTEM, self.system.clone()),
            KeyValue::new(keys::DB_OPERATION, self.operation.clone()),
        ];
        if let Some(db_name) = &self.db_name {
            attributes.push(KeyValue::new(keys::DB_NAME, db_name.clone()));
        }
        attributes
    }

    pub fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        traced(self.span_name(), self.attributes(), f)
    }

    pub async fn run_async<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        traced_async(self.span_name(), self.attributes(), fut).await
    }
}

/// Agent task execution: fixed `agent_task` span with crew/agent/task type.
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub crew: String,
    pub agent: String,
    pub task_type: String,
}

impl AgentTask {
    pub fn new(
        crew: impl Into<String>,
        agent: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            crew: crew.into(),
            agent: agent.into(),
            task_type: task_type.into(),
        }
    }

    pub fn span_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(names::AGENT_TASK)
    }

    pub fn attributes(&self) -> Vec<KeyValue> {
        vec![
            KeyValue::new(keys::CREW_NAME, self.crew.clone()),
            KeyValue::new(keys::AGENT_NAME, self.agent.clone()),
            KeyValue::new(keys::TASK_TYPE, self.task_type.clone()),
        ]
    }

    pub fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        traced(self.span_name(), self.attributes(), f)
    }

    pub async fn run_async<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        traced_async(self.span_name(), self.attributes(), fut).await
    }
}

/// Fraud detection: fixed `fraud_detection` span with detection type and
/// optional wallet address.
#[derive(Debug, Clone)]
pub struct FraudDetection {
    pub detection_type: String,
    pub wallet_address: Option<String>,
}

impl FraudDetection {
    pub fn new(detection_type: impl Into<String>) -> Self {
        Self {
            detection_type: detection_type.into(),
            wallet_address: None,
        }
    }

    pub fn with_wallet_address(mut self, wallet_address: impl Into<String>) -> Self {
        self.wallet_address = Some(wallet_address.into());
        self
    }

    pub fn span_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(names::FRAUD_DETECTION)
    }

    pub fn attributes(&self) -> Vec<KeyValue> {
        let mut attributes = vec![KeyValue::new(keys::FRAUD_TYPE, self.detection_type.clone())];
        if let Some(wallet_address) = &self.wallet_address {
            attributes.push(KeyValue::new(keys::WALLET_ADDRESS, wallet_address.clone()));
        }
        attributes
    }

    pub fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        traced(self.span_name(), self.attributes(), f)
    }

    pub async fn run_async<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        traced_async(self.span_name(), self.attributes(), fut).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a KeyValue> {
        attributes.iter().find(|kv| kv.key.as_str() == key)
    }

    #[test]
    fn test_api_call_mapping() {
        let call = ApiCall::new(ApiProvider::Moralis, "/api/v2.2/wallets").with_method("POST");
        assert_eq!(call.span_name(), "moralis_api_call");

        let attributes = call.attributes();
        assert_eq!(
            attribute(&attributes, keys::API_PROVIDER).unwrap().value.as_str(),
            "moralis"
        );
        assert_eq!(
            attribute(&attributes, keys::API_METHOD).unwrap().value.as_str(),
            "POST"
        );
    }

    #[test]
    fn test_db_operation_mapping() {
        let op = DbOperation::new("neo4j", "query").with_db_name("graph");
        assert_eq!(op.span_name(), "neo4j_query");
        assert_eq!(op.attributes().len(), 3);

        let without_name = DbOperation::new("redis", "operation");
        assert_eq!(without_name.span_name(), "redis_operation");
        assert_eq!(without_name.attributes().len(), 2);
    }

    #[test]
    fn test_agent_task_mapping() {
        let task = AgentTask::new("fraud_crew", "graph_analyst", "community_detection");
        assert_eq!(task.span_name(), names::AGENT_TASK);
        let attributes = task.attributes();
        assert_eq!(
            attribute(&attributes, keys::CREW_NAME).unwrap().value.as_str(),
            "fraud_crew"
        );
    }

    #[test]
    fn test_fraud_detection_mapping() {
        let detection = FraudDetection::new("wash_trading").with_wallet_address("0xabc");
        assert_eq!(detection.span_name(), names::FRAUD_DETECTION);
        let attributes = detection.attributes();
        assert_eq!(
            attribute(&attributes, keys::WALLET_ADDRESS).unwrap().value.as_str(),
            "0xabc"
        );

        let bare = FraudDetection::new("mixer_proximity");
        assert_eq!(bare.attributes().len(), 1);
    }

    #[test]
    fn test_builders_pass_results_through() {
        let call = ApiCall::new(ApiProvider::Sim, "/v1/evm/balances");
        let ok: Result<u16, String> = call.run(|| Ok(200));
        assert_eq!(ok, Ok(200));

        let detection = FraudDetection::new("wash_trading");
        let err: Result<(), String> = detection.run(|| Err("model offline".to_string()));
        assert_eq!(err, Err("model offline".to_string()));
    }
}
