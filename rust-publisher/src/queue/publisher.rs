//! Async publisher for JSON messages on the declared topic exchange.
//!
//! The publisher is a stateless pass-through: each call serializes the payload,
//! makes exactly one send attempt, and returns the outcome to the caller.
//! Nothing is retried or buffered, and failures are never swallowed.

use std::sync::Arc;

use serde::Serialize;

use super::observer::{PublishEvent, PublishObserver, TracingObserver, UnroutableWarning};
use super::serializer::JsonSerializer;
use crate::error::PublishError;
use crate::topology::DeclaredTopology;
use crate::transport::{SendOutcome, Transport};

/// What the broker did with an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub exchange: String,
    pub routing_key: String,
    pub body_length: usize,
    pub outcome: SendOutcome,
}

/// Publishes serialized payloads to the declared exchange.
///
/// Cloning is cheap and clones share the transport.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    transport: Arc<dyn Transport>,
    serializer: JsonSerializer,
    observer: Arc<dyn PublishObserver>,
    exchange: String,
    routing_key: String,
}

impl Publisher {
    /// Create a publisher bound to the topology's exchange that sends under
    /// the JSON binding's routing key.
    pub fn new(transport: Arc<dyn Transport>, topology: &DeclaredTopology) -> Self {
        Self::with_observer(transport, topology, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        transport: Arc<dyn Transport>,
        topology: &DeclaredTopology,
        observer: Arc<dyn PublishObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                transport,
                serializer: JsonSerializer,
                observer,
                exchange: topology.exchange().name.clone(),
                routing_key: topology.json_binding().routing_key.clone(),
            }),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.inner.exchange
    }

    /// Routing key used by [`publish`](Self::publish).
    pub fn routing_key(&self) -> &str {
        &self.inner.routing_key
    }

    /// Publish `payload` under the publisher's routing key.
    pub async fn publish<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<PublishReceipt, PublishError> {
        self.send(&self.inner.routing_key, payload, None).await
    }

    /// Publish `payload` under the publisher's routing key, tagged with a
    /// message id.
    pub async fn publish_with_id<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        message_id: impl Into<String>,
    ) -> Result<PublishReceipt, PublishError> {
        self.send(&self.inner.routing_key, payload, Some(message_id.into()))
            .await
    }

    /// Publish `payload` under an explicit routing key.
    pub async fn publish_to<T: Serialize + ?Sized>(
        &self,
        routing_key: &str,
        payload: &T,
    ) -> Result<PublishReceipt, PublishError> {
        self.send(routing_key, payload, None).await
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        routing_key: &str,
        payload: &T,
        message_id: Option<String>,
    ) -> Result<PublishReceipt, PublishError> {
        let inner = &self.inner;

        let message = match inner
            .serializer
            .to_message(routing_key, payload, message_id.clone())
        {
            Ok(message) => message,
            Err(e) => {
                let err = PublishError::Serialization(e);
                let event = PublishEvent {
                    exchange: &inner.exchange,
                    routing_key,
                    message_id: message_id.as_deref(),
                    body_length: 0,
                };
                inner.observer.failed(&event, &err);
                return Err(err);
            }
        };

        let event = PublishEvent {
            exchange: &inner.exchange,
            routing_key,
            message_id: message.message_id.as_deref(),
            body_length: message.body.len(),
        };

        let outcome = match inner.transport.send(&inner.exchange, &message).await {
            Ok(outcome) => outcome,
            Err(source) => {
                let err = PublishError::Transport {
                    exchange: inner.exchange.clone(),
                    routing_key: routing_key.to_string(),
                    source,
                };
                inner.observer.failed(&event, &err);
                return Err(err);
            }
        };

        if outcome == SendOutcome::Unroutable {
            inner.observer.unroutable(&UnroutableWarning {
                exchange: inner.exchange.clone(),
                routing_key: routing_key.to_string(),
                message_id: message.message_id.clone(),
            });
        } else {
            inner.observer.published(&event);
        }

        Ok(PublishReceipt {
            exchange: inner.exchange.clone(),
            routing_key: routing_key.to_string(),
            body_length: message.body.len(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::config::TopologyConfig;
    use crate::error::TransportError;
    use crate::queue::User;
    use crate::topology::TopologyDeclarator;
    use crate::transport::InMemoryBroker;

    #[derive(Default)]
    struct Recorder {
        published: Mutex<Vec<String>>,
        unroutable: Mutex<Vec<UnroutableWarning>>,
        failed: Mutex<Vec<String>>,
        failed_ids: Mutex<Vec<Option<String>>>,
    }

    impl PublishObserver for Recorder {
        fn published(&self, event: &PublishEvent<'_>) {
            self.published.lock().unwrap().push(event.routing_key.to_string());
        }

        fn unroutable(&self, warning: &UnroutableWarning) {
            self.unroutable.lock().unwrap().push(warning.clone());
        }

        fn failed(&self, event: &PublishEvent<'_>, error: &PublishError) {
            self.failed.lock().unwrap().push(error.to_string());
            self.failed_ids
                .lock()
                .unwrap()
                .push(event.message_id.map(str::to_string));
        }
    }

    async fn setup() -> (InMemoryBroker, DeclaredTopology) {
        let broker = InMemoryBroker::new();
        let config = TopologyConfig {
            queue_name: "users.queue".to_string(),
            queue_json_name: "users.json.queue".to_string(),
            exchange_name: "users.topic".to_string(),
            routing_key: "users.plain".to_string(),
            routing_json_key: "users.json".to_string(),
        };
        let topology = TopologyDeclarator::new(Arc::new(broker.clone()))
            .declare(&config)
            .await
            .unwrap();
        (broker, topology)
    }

    #[tokio::test]
    async fn test_publish_uses_json_routing_key() {
        let (broker, topology) = setup().await;
        let recorder = Arc::new(Recorder::default());
        let publisher =
            Publisher::with_observer(Arc::new(broker.clone()), &topology, recorder.clone());

        let receipt = publisher.publish(&User::new(7, "Bob")).await.unwrap();

        assert_eq!(receipt.routing_key, "users.json");
        assert_eq!(receipt.exchange, "users.topic");
        assert_eq!(receipt.outcome, SendOutcome::Delivered);
        assert_eq!(*recorder.published.lock().unwrap(), vec!["users.json"]);

        let delivered = broker.messages("users.json.queue");
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].content_type, "application/json");
        assert_eq!(delivered[0].decode::<User>().unwrap(), User::new(7, "Bob"));
    }

    #[tokio::test]
    async fn test_publish_with_id_tags_message() {
        let (broker, topology) = setup().await;
        let publisher = Publisher::new(Arc::new(broker.clone()), &topology);

        publisher
            .publish_with_id(&User::new(3, "Cy"), "user-3")
            .await
            .unwrap();

        let delivered = broker.pop("users.json.queue").unwrap();
        assert_eq!(delivered.message_id.as_deref(), Some("user-3"));
    }

    #[tokio::test]
    async fn test_unroutable_is_a_warning_not_an_error() {
        let (broker, topology) = setup().await;
        let recorder = Arc::new(Recorder::default());
        let publisher =
            Publisher::with_observer(Arc::new(broker.clone()), &topology, recorder.clone());

        let receipt = publisher
            .publish_to("nobody.listens", &User::new(1, "Eve"))
            .await
            .unwrap();

        assert_eq!(receipt.outcome, SendOutcome::Unroutable);
        let warnings = recorder.unroutable.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].routing_key, "nobody.listens");
        assert!(recorder.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let (broker, topology) = setup().await;
        let recorder = Arc::new(Recorder::default());
        let publisher =
            Publisher::with_observer(Arc::new(broker.clone()), &topology, recorder.clone());
        broker.fail_sends("connection closed");

        let err = publisher.publish(&User::new(1, "Eve")).await.unwrap_err();

        assert!(matches!(
            err,
            PublishError::Transport { source: TransportError::Unavailable(_), .. }
        ));
        assert_eq!(broker.send_attempts(), 1);
        assert_eq!(recorder.failed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unserializable_payload_is_never_sent() {
        let (broker, topology) = setup().await;
        let publisher = Publisher::new(Arc::new(broker.clone()), &topology);

        // JSON object keys must be strings.
        let mut payload = std::collections::HashMap::new();
        payload.insert((1u8, 2u8), "pair");

        let err = publisher.publish(&payload).await.unwrap_err();

        assert!(matches!(err, PublishError::Serialization(_)));
        assert_eq!(broker.send_attempts(), 0);
    }

    #[tokio::test]
    async fn test_serialization_failure_reports_message_id() {
        let (broker, topology) = setup().await;
        let recorder = Arc::new(Recorder::default());
        let publisher =
            Publisher::with_observer(Arc::new(broker.clone()), &topology, recorder.clone());

        let mut payload = std::collections::HashMap::new();
        payload.insert((4u8, 2u8), "pair");

        let err = publisher
            .publish_with_id(&payload, "order-9")
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Serialization(_)));
        assert_eq!(
            *recorder.failed_ids.lock().unwrap(),
            vec![Some("order-9".to_string())]
        );
        assert_eq!(broker.send_attempts(), 0);
    }
}
