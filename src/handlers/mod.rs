pub mod send_sms;
pub mod weather;

use axum::{response::IntoResponse, Json};

use crate::models::HealthResponse;

pub use send_sms::send_sms;
pub use weather::current_weather;

/// Liveness only; no dependency checks
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "CoastGuard alert service is running".to_string(),
    })
}
