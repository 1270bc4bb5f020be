use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Probe the state store and report whether the bot can persist rounds.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let status = match state.store().health_check().await {
        Ok(()) => HealthStatus::Ok,
        Err(err) => {
            warn!(error = %err, "state store health check failed");
            HealthStatus::Degraded
        }
    };
    status.into()
}
