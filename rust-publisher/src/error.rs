//! Error types shared across topology declaration and publishing.

use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration key `{0}`")]
    Missing(&'static str),
    #[error("configuration key `{0}` is empty")]
    Empty(&'static str),
}

/// Kind of broker object a declaration refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Exchange,
    Queue,
    Binding,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ObjectKind::Exchange => "exchange",
            ObjectKind::Queue => "queue",
            ObjectKind::Binding => "binding",
        })
    }
}

/// Failure reported by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An object with the same name exists with different settings.
    #[error("{kind} `{name}` already exists with different settings: {detail}")]
    Conflict {
        kind: ObjectKind,
        name: String,
        detail: String,
    },
    /// The broker denied the operation.
    #[error("access refused: {0}")]
    AccessRefused(String),
    /// A referenced exchange or queue does not exist.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: ObjectKind, name: String },
    /// No connection or channel to the broker.
    #[error("broker unavailable: {0}")]
    Unavailable(String),
    /// The broker negatively acknowledged a published message.
    #[error("broker rejected message for routing key `{0}`")]
    Nacked(String),
    /// Any other protocol-level failure.
    #[error("broker error: {0}")]
    Broker(String),
}

/// Topology declaration failed; startup must not continue.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("conflicting {kind} declaration for `{name}`: {detail}")]
    Conflict {
        kind: ObjectKind,
        name: String,
        detail: String,
    },
    #[error("permission denied declaring {kind} `{name}`: {reason}")]
    AccessRefused {
        kind: ObjectKind,
        name: String,
        reason: String,
    },
    #[error("broker unreachable while declaring {kind} `{name}`: {reason}")]
    Unavailable {
        kind: ObjectKind,
        name: String,
        reason: String,
    },
    #[error("failed to declare {kind} `{name}`: {source}")]
    Broker {
        kind: ObjectKind,
        name: String,
        #[source]
        source: TransportError,
    },
}

impl TopologyError {
    /// Attribute a transport failure to the object being declared.
    pub fn from_transport(kind: ObjectKind, name: &str, err: TransportError) -> Self {
        let name = name.to_string();
        match err {
            TransportError::Conflict { detail, .. } => TopologyError::Conflict { kind, name, detail },
            TransportError::AccessRefused(reason) => {
                TopologyError::AccessRefused { kind, name, reason }
            }
            TransportError::Unavailable(reason) => {
                TopologyError::Unavailable { kind, name, reason }
            }
            source => TopologyError::Broker { kind, name, source },
        }
    }
}

/// A single publish call failed. The message was not delivered.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The payload could not be encoded; nothing was sent.
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The transport rejected the send or had no connection.
    #[error("failed to send to exchange `{exchange}` with routing key `{routing_key}`: {source}")]
    Transport {
        exchange: String,
        routing_key: String,
        #[source]
        source: TransportError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_error_from_conflict() {
        let err = TopologyError::from_transport(
            ObjectKind::Exchange,
            "orders.topic",
            TransportError::Conflict {
                kind: ObjectKind::Exchange,
                name: "orders.topic".to_string(),
                detail: "kind topic != direct".to_string(),
            },
        );
        assert!(matches!(err, TopologyError::Conflict { kind: ObjectKind::Exchange, .. }));
        assert!(err.to_string().contains("orders.topic"));
    }

    #[test]
    fn test_topology_error_wraps_other_failures() {
        let err = TopologyError::from_transport(
            ObjectKind::Binding,
            "orders.json.queue",
            TransportError::Broker("channel closed".to_string()),
        );
        assert!(matches!(err, TopologyError::Broker { kind: ObjectKind::Binding, .. }));
    }
}
