//! Publish event hooks.
//!
//! The publisher reports each outcome to a [`PublishObserver`]. The default
//! [`TracingObserver`] writes structured log events; tests and embedders may
//! inject their own.

use tracing::{error, info, warn};

use crate::error::PublishError;

/// Facts about one publish call.
#[derive(Debug, Clone, Copy)]
pub struct PublishEvent<'a> {
    pub exchange: &'a str,
    pub routing_key: &'a str,
    pub message_id: Option<&'a str>,
    pub body_length: usize,
}

/// Advisory: the broker accepted a message that matched no binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnroutableWarning {
    pub exchange: String,
    pub routing_key: String,
    pub message_id: Option<String>,
}

/// Receives publish outcomes. Every method defaults to doing nothing.
pub trait PublishObserver: Send + Sync {
    fn published(&self, _event: &PublishEvent<'_>) {}

    fn unroutable(&self, _warning: &UnroutableWarning) {}

    fn failed(&self, _event: &PublishEvent<'_>, _error: &PublishError) {}
}

/// Logs publish outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PublishObserver for TracingObserver {
    fn published(&self, event: &PublishEvent<'_>) {
        info!(
            exchange = %event.exchange,
            routing_key = %event.routing_key,
            message_id = event.message_id,
            body_length = event.body_length,
            "rabbitmq_message_published"
        );
    }

    fn unroutable(&self, warning: &UnroutableWarning) {
        warn!(
            exchange = %warning.exchange,
            routing_key = %warning.routing_key,
            message_id = warning.message_id.as_deref(),
            "rabbitmq_message_unroutable"
        );
    }

    fn failed(&self, event: &PublishEvent<'_>, error: &PublishError) {
        error!(
            exchange = %event.exchange,
            routing_key = %event.routing_key,
            message_id = event.message_id,
            error = %error,
            "rabbitmq_publish_failed"
        );
    }
}
