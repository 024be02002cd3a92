// handlers/public/health.rs - GET /health handler

use serde_json::json;
use std::sync::Arc;

use crate::middleware::ApiResponse;
use crate::router::{ApiRequest, HandlerResult};
use crate::services::WeatherService;

/// GET /health - Liveness plus table reachability. Always 200.
pub async fn health(service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    let db_healthy = service.store().health_check().await;

    Ok(ApiResponse::ok(json!({
        "status": if db_healthy { "healthy" } else { "degraded" },
        "service": "weather-api",
        "database": if db_healthy { "connected" } else { "disconnected" },
    })))
}
