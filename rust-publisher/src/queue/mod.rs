//! Queue module for publishing messages.
//!
//! This module provides:
//! - Message types for the JSON queue
//! - JSON serialization of payloads
//! - Async publisher and its observer hooks
//!
//! ## Flow
//!
//! ```text
//! payload → JsonSerializer → OutboundMessage → Transport::send → exchange
//! ```

pub mod observer;
pub mod publisher;
pub mod serializer;
pub mod types;

pub use observer::{PublishEvent, PublishObserver, TracingObserver, UnroutableWarning};
pub use publisher::{PublishReceipt, Publisher};
pub use serializer::{JsonSerializer, JSON_CONTENT_TYPE};
pub use types::User;
