use axum::Json;

use crate::api::HealthResponse;

/// `GET /api/health`
///
/// Lightweight liveness probe for monitoring.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Office Display Backend is running",
    })
}
