//! HTTP surface for publishing users.
//!
//! - `GET /health`: liveness probe
//! - `POST /api/v1/publish`: publish a JSON `User` to the JSON queue

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, publish_user, AppState, HealthResponse, PublishResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/publish", post(publish_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
