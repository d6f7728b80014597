//! In-process broker for tests and local development.
//!
//! Implements [`Transport`] with the same declaration and routing rules as a
//! RabbitMQ broker: topic/direct/fanout routing, conflict detection on
//! re-declaration, and per-queue message buffers that can be inspected.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{topic_matches, OutboundMessage, SendOutcome, Transport};
use crate::error::{ObjectKind, TransportError};
use crate::topology::{Binding, Exchange, ExchangeKind, Queue};

/// A message as stored in a queue buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub exchange: String,
    pub routing_key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub message_id: Option<String>,
}

impl DeliveredMessage {
    /// Decode the body as JSON.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Default)]
struct BrokerState {
    exchanges: HashMap<String, Exchange>,
    queues: HashMap<String, (Queue, VecDeque<DeliveredMessage>)>,
    bindings: Vec<Binding>,
    send_attempts: usize,
    send_failure: Option<String>,
    deny_declarations: bool,
}

/// Thread-safe in-memory broker; clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following send fail with [`TransportError::Unavailable`].
    pub fn fail_sends(&self, reason: impl Into<String>) {
        self.state().send_failure = Some(reason.into());
    }

    /// Let sends succeed again.
    pub fn restore_sends(&self) {
        self.state().send_failure = None;
    }

    /// Refuse all declarations, as a broker would for a user lacking
    /// configure permission.
    pub fn deny_declarations(&self) {
        self.state().deny_declarations = true;
    }

    /// Number of send attempts seen, including failed ones.
    pub fn send_attempts(&self) -> usize {
        self.state().send_attempts
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.state().bindings.clone()
    }

    pub fn bindings_for_queue(&self, queue: &str) -> Vec<Binding> {
        self.state()
            .bindings
            .iter()
            .filter(|b| b.queue == queue)
            .cloned()
            .collect()
    }

    pub fn exchange(&self, name: &str) -> Option<Exchange> {
        self.state().exchanges.get(name).cloned()
    }

    pub fn queue(&self, name: &str) -> Option<Queue> {
        self.state().queues.get(name).map(|(q, _)| q.clone())
    }

    /// Messages currently buffered in `queue`, oldest first.
    pub fn messages(&self, queue: &str) -> Vec<DeliveredMessage> {
        self.state()
            .queues
            .get(queue)
            .map(|(_, buf)| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove and return the oldest message in `queue`.
    pub fn pop(&self, queue: &str) -> Option<DeliveredMessage> {
        self.state()
            .queues
            .get_mut(queue)
            .and_then(|(_, buf)| buf.pop_front())
    }
}

fn routes(kind: ExchangeKind, pattern: &str, routing_key: &str) -> bool {
    match kind {
        ExchangeKind::Topic => topic_matches(pattern, routing_key),
        ExchangeKind::Direct => pattern == routing_key,
        ExchangeKind::Fanout => true,
    }
}

fn check_allowed(state: &BrokerState, kind: ObjectKind, name: &str) -> Result<(), TransportError> {
    if state.deny_declarations {
        return Err(TransportError::AccessRefused(format!(
            "configure access to {kind} '{name}' refused"
        )));
    }
    Ok(())
}

#[async_trait]
impl Transport for InMemoryBroker {
    async fn declare_exchange(&self, exchange: &Exchange) -> Result<(), TransportError> {
        let mut state = self.state();
        check_allowed(&state, ObjectKind::Exchange, &exchange.name)?;

        match state.exchanges.get(&exchange.name).cloned() {
            Some(existing) if existing == *exchange => Ok(()),
            Some(existing) => Err(TransportError::Conflict {
                kind: ObjectKind::Exchange,
                name: exchange.name.clone(),
                detail: format!(
                    "existing kind={} durable={}, requested kind={} durable={}",
                    existing.kind, existing.durable, exchange.kind, exchange.durable
                ),
            }),
            None => {
                state.exchanges.insert(exchange.name.clone(), exchange.clone());
                Ok(())
            }
        }
    }

    async fn declare_queue(&self, queue: &Queue) -> Result<(), TransportError> {
        let mut state = self.state();
        check_allowed(&state, ObjectKind::Queue, &queue.name)?;

        match state.queues.get(&queue.name).map(|(q, _)| q.clone()) {
            Some(existing) if existing == *queue => Ok(()),
            Some(existing) => Err(TransportError::Conflict {
                kind: ObjectKind::Queue,
                name: queue.name.clone(),
                detail: format!(
                    "existing durable={}, requested durable={}",
                    existing.durable, queue.durable
                ),
            }),
            None => {
                state
                    .queues
                    .insert(queue.name.clone(), (queue.clone(), VecDeque::new()));
                Ok(())
            }
        }
    }

    async fn declare_binding(&self, binding: &Binding) -> Result<(), TransportError> {
        let mut state = self.state();
        check_allowed(&state, ObjectKind::Binding, &binding.queue)?;

        if !state.exchanges.contains_key(&binding.exchange) {
            return Err(TransportError::NotFound {
                kind: ObjectKind::Exchange,
                name: binding.exchange.clone(),
            });
        }
        if !state.queues.contains_key(&binding.queue) {
            return Err(TransportError::NotFound {
                kind: ObjectKind::Queue,
                name: binding.queue.clone(),
            });
        }
        if !state.bindings.contains(binding) {
            state.bindings.push(binding.clone());
        }
        Ok(())
    }

    async fn send(
        &self,
        exchange: &str,
        message: &OutboundMessage,
    ) -> Result<SendOutcome, TransportError> {
        let mut state = self.state();
        state.send_attempts += 1;

        if let Some(reason) = &state.send_failure {
            return Err(TransportError::Unavailable(reason.clone()));
        }

        let kind = match state.exchanges.get(exchange) {
            Some(ex) => ex.kind,
            None => {
                return Err(TransportError::NotFound {
                    kind: ObjectKind::Exchange,
                    name: exchange.to_string(),
                })
            }
        };

        // A queue bound several times still receives one copy.
        let mut targets: Vec<String> = state
            .bindings
            .iter()
            .filter(|b| b.exchange == exchange && routes(kind, &b.routing_key, &message.routing_key))
            .map(|b| b.queue.clone())
            .collect();
        targets.sort();
        targets.dedup();

        if targets.is_empty() {
            return Ok(SendOutcome::Unroutable);
        }

        for target in targets {
            if let Some((_, buf)) = state.queues.get_mut(&target) {
                buf.push_back(DeliveredMessage {
                    exchange: exchange.to_string(),
                    routing_key: message.routing_key.clone(),
                    body: message.body.clone(),
                    content_type: message.content_type.to_string(),
                    message_id: message.message_id.clone(),
                });
            }
        }

        Ok(SendOutcome::Delivered)
    }
}
