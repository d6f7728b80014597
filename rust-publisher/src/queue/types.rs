//! Domain message types published to the JSON queue.

use serde::{Deserialize, Serialize};

/// A user record, published as `{"id":..,"name":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Message id used for tracking this user on the broker.
    pub fn message_id(&self) -> String {
        format!("user-{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_format() {
        let user = User::new(42, "Alice");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":42,"name":"Alice"}"#);
        assert_eq!(user.message_id(), "user-42");
    }

    #[test]
    fn test_user_rejects_missing_field() {
        let parsed: Result<User, _> = serde_json::from_str(r#"{"id":1}"#);
        assert!(parsed.is_err());
    }
}
