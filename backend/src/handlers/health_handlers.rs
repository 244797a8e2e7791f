use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::handlers::contact_dtos::HealthResponse;

pub async fn api_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
