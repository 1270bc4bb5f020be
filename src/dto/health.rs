use serde::Serialize;
use utoipa::ToSchema;

/// Whether round state can currently be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The state store answers.
    Ok,
    /// The state store is unreachable; rounds cannot be saved.
    Degraded,
}

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
}

impl From<HealthStatus> for HealthResponse {
    fn from(status: HealthStatus) -> Self {
        Self { status }
    }
}
