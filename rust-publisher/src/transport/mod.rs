//! Broker transport abstraction.
//!
//! This module provides:
//! - The [`Transport`] trait used by the declarator and the publisher
//! - [`AmqpTransport`], backed by a lapin connection
//! - [`InMemoryBroker`], an in-process broker with topic routing
//!
//! ## Architecture
//!
//! ```text
//! TopologyDeclarator ─┐
//!                     ├─> Arc<dyn Transport> ─> broker
//! Publisher ──────────┘
//! ```

pub mod amqp;
pub mod memory;
pub mod pattern;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::topology::{Binding, Exchange, Queue};

pub use amqp::{AmqpSettings, AmqpTransport};
pub use memory::{DeliveredMessage, InMemoryBroker};
pub use pattern::topic_matches;

/// A message ready to be handed to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub routing_key: String,
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub message_id: Option<String>,
}

/// Result of a single accepted send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The broker confirmed the message and routed it to at least one queue.
    Delivered,
    /// The broker confirmed the message; without the mandatory flag it
    /// cannot say whether any binding matched.
    Accepted,
    /// The broker accepted the message but no binding matched.
    Unroutable,
    /// Sent without publisher confirms; routing is unknown.
    Unconfirmed,
}

/// Connection/channel abstraction over a message broker.
///
/// All declarations are idempotent: re-declaring an object with identical
/// settings succeeds, while different settings fail with
/// [`TransportError::Conflict`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn declare_exchange(&self, exchange: &Exchange) -> Result<(), TransportError>;

    async fn declare_queue(&self, queue: &Queue) -> Result<(), TransportError>;

    async fn declare_binding(&self, binding: &Binding) -> Result<(), TransportError>;

    /// Make exactly one send attempt of `message` to `exchange`.
    async fn send(
        &self,
        exchange: &str,
        message: &OutboundMessage,
    ) -> Result<SendOutcome, TransportError>;
}
