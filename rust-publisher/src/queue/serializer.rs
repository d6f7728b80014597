//! JSON wire encoding for published payloads.

use serde::Serialize;

use crate::transport::OutboundMessage;

/// Content type attached to every JSON message.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Stateless JSON serializer; safe to share between tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    /// Encode `payload` into a message envelope for `routing_key`.
    pub fn to_message<T: Serialize + ?Sized>(
        &self,
        routing_key: &str,
        payload: &T,
        message_id: Option<String>,
    ) -> serde_json::Result<OutboundMessage> {
        let body = serde_json::to_vec(payload)?;
        Ok(OutboundMessage {
            routing_key: routing_key.to_string(),
            body,
            content_type: self.content_type(),
            message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("opaque handle cannot be encoded"))
        }
    }

    #[test]
    fn test_to_message_sets_content_type() {
        let msg = JsonSerializer
            .to_message("orders.json", &serde_json::json!({"id": 1}), None)
            .unwrap();
        assert_eq!(msg.content_type, "application/json");
        assert_eq!(msg.routing_key, "orders.json");
        assert_eq!(msg.body, br#"{"id":1}"#);
    }

    #[test]
    fn test_to_message_propagates_encoding_error() {
        let err = JsonSerializer.to_message("k", &Opaque, None).unwrap_err();
        assert!(err.to_string().contains("opaque handle"));
    }
}
