use thiserror::Error;

/// Failures reported by a host bridge operation.
///
/// These never escape the polling client; each one only removes a single
/// candidate from consideration.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("bridge method {method} rejected: {reason}")]
    Rejected { method: String, reason: String },

    #[error("bridge method {method} did not settle within {timeout_ms}ms")]
    TimedOut { method: String, timeout_ms: u64 },
}

/// Failures delivering an outbound action to the host.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    #[error("parent frame unreachable: {0}")]
    ParentUnreachable(String),

    #[error("event dispatch failed for {event}: {reason}")]
    Dispatch { event: String, reason: String },
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("YAML parse error for {context}: {source}")]
    Fixture {
        context: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
