use axum::Json;
use serde::Serialize;

/// The (empty) health check body.
#[derive(Serialize)]
pub struct HealthResponse {}

/// Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {})
}
