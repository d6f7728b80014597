//! Relay - RabbitMQ topic-exchange publisher.
//!
//! This library declares a messaging topology and publishes JSON-encoded
//! domain objects to it:
//! - `topology`: exchange, queues and bindings declared once at startup
//! - `queue`: serializer and publisher
//! - `transport`: broker abstraction with lapin and in-memory backends
//!
//! ## Architecture
//!
//! ```text
//! Config → TopologyDeclarator → DeclaredTopology → Publisher → Transport → exchange → queues
//! ```

pub mod config;
pub mod error;
pub mod queue;
pub mod topology;
pub mod transport;
pub mod web;

// Re-export commonly used types
pub use config::{Config, TopologyConfig};
pub use error::{ConfigError, PublishError, TopologyError, TransportError};
pub use queue::{PublishObserver, PublishReceipt, Publisher, User};
pub use topology::{DeclaredTopology, TopologyDeclarator};
pub use transport::{AmqpSettings, AmqpTransport, InMemoryBroker, SendOutcome, Transport};
pub use web::AppState;
