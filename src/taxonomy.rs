//! Span-name and attribute-key taxonomy
//!
//! The closed catalogs used by every instrumented call site. Adding an entry
//! is a taxonomy change reviewed here, never ad-hoc strings at call sites.

/// Standard span names for consistent tracing.
///
/// Keep these stable; changing them is a breaking change for dashboards.
pub mod names {
    // External API calls
    pub const API_CALL: &str = "external_api_call";
    pub const SIM_API_CALL: &str = "sim_api_call";
    pub const COVALENT_API_CALL: &str = "covalent_api_call";
    pub const MORALIS_API_CALL: &str = "moralis_api_call";
    pub const GEMINI_API_CALL: &str = "gemini_api_call";

    // Database operations
    pub const NEO4J_QUERY: &str = "neo4j_query";
    pub const NEO4J_INGEST: &str = "neo4j_ingest";
    pub const POSTGRES_QUERY: &str = "postgres_query";
    pub const REDIS_OPERATION: &str = "redis_operation";

    // Agent workflows
    pub const CREW_EXECUTION: &str = "crew_execution";
    pub const AGENT_TASK: &str = "agent_task";
    pub const TOOL_EXECUTION: &str = "tool_execution";

    // Business logic
    pub const FRAUD_DETECTION: &str = "fraud_detection";
    pub const GRAPH_ANALYSIS: &str = "graph_analysis";
    pub const RAG_QUERY: &str = "rag_query";
    pub const EVIDENCE_PROCESSING: &str = "evidence_processing";
}

/// Standard span attribute keys for consistent metadata.
///
/// Partitioned into service, API, database, agent-workflow, and
/// business-logic namespaces. Keep these stable as well.
pub mod keys {
    // Service attributes
    pub const SERVICE_NAME: &str = "service.name";
    pub const SERVICE_VERSION: &str = "service.version";
    pub const SERVICE_NAMESPACE: &str = "service.namespace";
    pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

    // External API attributes
    pub const API_PROVIDER: &str = "api.provider";
    pub const API_ENDPOINT: &str = "api.endpoint";
    pub const API_METHOD: &str = "api.method";
    pub const API_STATUS_CODE: &str = "api.status_code";
    pub const API_COST_USD: &str = "api.cost_usd";
    pub const API_RATE_LIMITED: &str = "api.rate_limited";
    pub const API_RETRY_AFTER: &str = "api.retry_after";

    // Database attributes
    pub const DB_SYSTEM: &str = "db.system";
    pub const DB_NAME: &str = "db.name";
    pub const DB_OPERATION: &str = "db.operation";
    pub const DB_STATEMENT: &str = "db.statement";
    pub const DB_ROWS_AFFECTED: &str = "db.rows_affected";

    // Agent attributes
    pub const CREW_NAME: &str = "crew.name";
    pub const AGENT_NAME: &str = "agent.name";
    pub const TASK_TYPE: &str = "task.type";
    pub const TOOL_NAME: &str = "tool.name";

    // Business logic attributes
    pub const WALLET_ADDRESS: &str = "blockchain.wallet_address";
    pub const CHAIN_ID: &str = "blockchain.chain_id";
    pub const TOKEN_ADDRESS: &str = "blockchain.token_address";
    pub const FRAUD_SCORE: &str = "fraud.score";
    pub const FRAUD_TYPE: &str = "fraud.type";

    // Error event attributes (OpenTelemetry exception semantics)
    pub const EXCEPTION_MESSAGE: &str = "exception.message";
}

/// Name of the event recorded on a span when a wrapped operation fails.
pub const ERROR_EVENT: &str = "exception";
