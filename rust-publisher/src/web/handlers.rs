//! HTTP endpoint handlers.
//!
//! The publish handler does no work beyond handing the body to the
//! [`Publisher`] and translating the outcome into a status code.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::PublishError;
use crate::queue::{Publisher, User};
use crate::transport::SendOutcome;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Publish
// =============================================================================

/// Publish response.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishResponse {
    fn failure(status: &'static str, error: &PublishError) -> Self {
        Self {
            status,
            routing_key: None,
            error: Some(error.to_string()),
        }
    }
}

/// Publish a user to the JSON queue.
///
/// Returns 200 when the broker accepted the message (`unroutable` when no
/// binding matched), 400 when the payload could not be encoded and 502 when
/// the broker could not be reached.
pub async fn publish_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> impl IntoResponse {
    info!(user_id = user.id, "publish_request_received");

    match state
        .publisher
        .publish_with_id(&user, user.message_id())
        .await
    {
        Ok(receipt) => {
            let status = match receipt.outcome {
                SendOutcome::Unroutable => "unroutable",
                SendOutcome::Delivered | SendOutcome::Accepted | SendOutcome::Unconfirmed => {
                    "published"
                },
            };
            (
                StatusCode::OK,
                Json(PublishResponse {
                    status,
                    routing_key: Some(receipt.routing_key),
                    error: None,
                }),
            )
        }
        Err(e @ PublishError::Serialization(_)) => {
            warn!(user_id = user.id, error = %e, "publish_request_rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(PublishResponse::failure("invalid_payload", &e)),
            )
        }
        Err(e @ PublishError::Transport { .. }) => (
            StatusCode::BAD_GATEWAY,
            Json(PublishResponse::failure("error", &e)),
        ),
    }
}
