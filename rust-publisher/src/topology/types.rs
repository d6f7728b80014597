//! Value types describing the broker topology.

use std::fmt;

/// Routing algorithm of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
    /// Routing-key pattern matching with `*` and `#` wildcards.
    Topic,
    /// Exact routing-key match.
    Direct,
    /// Every bound queue receives every message.
    Fanout,
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExchangeKind::Topic => "topic",
            ExchangeKind::Direct => "direct",
            ExchangeKind::Fanout => "fanout",
        })
    }
}

/// A declared exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub name: String,
    pub kind: ExchangeKind,
    pub durable: bool,
}

impl Exchange {
    /// A durable topic exchange, the only kind this service declares.
    pub fn topic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ExchangeKind::Topic,
            durable: true,
        }
    }
}

/// A declared queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    pub name: String,
    pub durable: bool,
}

impl Queue {
    pub fn durable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            durable: true,
        }
    }

    pub fn transient(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            durable: false,
        }
    }
}

/// Links a queue to an exchange under a routing-key pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub queue: String,
    pub exchange: String,
    pub routing_key: String,
}

impl Binding {
    pub fn new(queue: &Queue, exchange: &Exchange, routing_key: impl Into<String>) -> Self {
        Self {
            queue: queue.name.clone(),
            exchange: exchange.name.clone(),
            routing_key: routing_key.into(),
        }
    }
}

/// Topology confirmed by the broker at startup.
///
/// Only [`TopologyDeclarator::declare`](super::TopologyDeclarator::declare)
/// creates this value, so holding one proves declaration succeeded.
#[derive(Debug, Clone)]
pub struct DeclaredTopology {
    pub(crate) exchange: Exchange,
    pub(crate) queue: Queue,
    pub(crate) json_queue: Queue,
    pub(crate) binding: Binding,
    pub(crate) json_binding: Binding,
}

impl DeclaredTopology {
    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn json_queue(&self) -> &Queue {
        &self.json_queue
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn json_binding(&self) -> &Binding {
        &self.json_binding
    }
}
