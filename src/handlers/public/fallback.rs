// handlers/public/fallback.rs - preflight and unmatched routes

use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::router::{ApiRequest, HandlerResult};
use crate::services::WeatherService;

/// OPTIONS on any registered path - CORS preflight
pub async fn options(_service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    Ok(ApiResponse::ok(json!({})))
}

pub async fn not_found(_service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    Err(ApiError::not_found("Endpoint not found"))
}
