use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document routes.
pub mod docs;
/// Health check route.
pub mod health;
/// Chat webhook route.
pub mod webhook;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(webhook::router())
        .merge(docs::router())
        .with_state(state)
}
