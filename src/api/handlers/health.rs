use axum::Json;
use serde::Serialize;

/// Static liveness payload; does not touch the ledger.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        success: true,
        status: "OK",
        message: "Core Banking API is running",
    })
}
