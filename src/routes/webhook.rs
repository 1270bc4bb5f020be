use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use tracing::{debug, error, warn};

use crate::{
    dto::webhook::InboundMessage,
    services::webhook_service::{self, Dispatch},
    state::SharedState,
};

/// Routes receiving chat messages from the chat provider.
pub fn router() -> Router<SharedState> {
    Router::new().route("/submit_message", post(submit_message))
}

#[utoipa::path(
    post,
    path = "/submit_message",
    tag = "webhook",
    request_body = InboundMessage,
    responses((status = 200, description = "Message received; the outcome is posted to the chat"))
)]
/// Accept one chat message. Always answers 200: outcomes are reported in the chat.
pub async fn submit_message(State(state): State<SharedState>, body: Bytes) -> StatusCode {
    let message = match serde_json::from_slice::<InboundMessage>(&body) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "discarding undecodable webhook payload");
            return StatusCode::OK;
        }
    };

    match webhook_service::handle_message(&state, message).await {
        Ok(Dispatch::Ignored | Dispatch::NoOp) => {}
        Ok(dispatch) => debug!(?dispatch, "message handled"),
        Err(err) => error!(error = %err, "failed to handle chat message"),
    }

    StatusCode::OK
}
