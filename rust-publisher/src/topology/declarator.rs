//! Startup declaration of the exchange, queues and bindings.

use std::sync::Arc;

use tracing::{error, info};

use super::types::{Binding, DeclaredTopology, Exchange, Queue};
use crate::config::TopologyConfig;
use crate::error::{ObjectKind, TopologyError};
use crate::transport::Transport;

/// Declares broker objects through a [`Transport`].
///
/// Every declaration is idempotent against a broker that already holds a
/// matching object, and fails with [`TopologyError`] when it holds an
/// incompatible one.
#[derive(Clone)]
pub struct TopologyDeclarator {
    transport: Arc<dyn Transport>,
}

impl TopologyDeclarator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Declare a durable topic exchange.
    pub async fn declare_exchange(&self, name: &str) -> Result<Exchange, TopologyError> {
        let exchange = Exchange::topic(name);
        self.transport
            .declare_exchange(&exchange)
            .await
            .map_err(|e| TopologyError::from_transport(ObjectKind::Exchange, name, e))?;
        Ok(exchange)
    }

    /// Declare a durable queue.
    pub async fn declare_queue(&self, name: &str) -> Result<Queue, TopologyError> {
        let queue = Queue::durable(name);
        self.transport
            .declare_queue(&queue)
            .await
            .map_err(|e| TopologyError::from_transport(ObjectKind::Queue, name, e))?;
        Ok(queue)
    }

    /// Bind `queue` to `exchange` under `routing_key_pattern`.
    pub async fn declare_binding(
        &self,
        queue: &Queue,
        exchange: &Exchange,
        routing_key_pattern: &str,
    ) -> Result<Binding, TopologyError> {
        let binding = Binding::new(queue, exchange, routing_key_pattern);
        self.transport
            .declare_binding(&binding)
            .await
            .map_err(|e| TopologyError::from_transport(ObjectKind::Binding, &queue.name, e))?;
        Ok(binding)
    }

    /// Declare the full topology: exchange, then both queues, then both
    /// bindings. Stops at the first failure.
    pub async fn declare(&self, config: &TopologyConfig) -> Result<DeclaredTopology, TopologyError> {
        info!(
            exchange = %config.exchange_name,
            queue = %config.queue_name,
            json_queue = %config.queue_json_name,
            "topology_declare_start"
        );

        let result = self.declare_all(config).await;

        match &result {
            Ok(topology) => info!(
                exchange = %topology.exchange.name,
                routing_key = %topology.binding.routing_key,
                json_routing_key = %topology.json_binding.routing_key,
                "topology_declared"
            ),
            Err(e) => error!(error = %e, "topology_declare_failed"),
        }

        result
    }

    async fn declare_all(&self, config: &TopologyConfig) -> Result<DeclaredTopology, TopologyError> {
        let exchange = self.declare_exchange(&config.exchange_name).await?;

        let queue = self.declare_queue(&config.queue_name).await?;
        let json_queue = self.declare_queue(&config.queue_json_name).await?;

        let binding = self
            .declare_binding(&queue, &exchange, &config.routing_key)
            .await?;
        let json_binding = self
            .declare_binding(&json_queue, &exchange, &config.routing_json_key)
            .await?;

        Ok(DeclaredTopology {
            exchange,
            queue,
            json_queue,
            binding,
            json_binding,
        })
    }
}
