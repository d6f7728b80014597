//! Broker topology: one topic exchange, a plain queue and a JSON queue, each
//! bound to the exchange under its own routing key.
//!
//! ```text
//!                     ┌─ routing.key ──────> queue.name
//! exchange.name ──────┤
//!   (topic)           └─ routing.json.key ─> queue.json.name
//! ```

pub mod declarator;
pub mod types;

pub use declarator::TopologyDeclarator;
pub use types::{Binding, DeclaredTopology, Exchange, ExchangeKind, Queue};
