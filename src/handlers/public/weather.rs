// handlers/public/weather.rs - unauthenticated weather endpoints

use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::middleware::ApiResponse;
use crate::router::{ApiRequest, HandlerResult};
use crate::services::WeatherService;

/// GET /weather/types - List the weather type lookup table
pub async fn weather_types(_service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    Ok(ApiResponse::success(WeatherService::get_weather_types()))
}

/// POST /weather/generate - Store a fresh random reading for every city
pub async fn generate_weather(service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    let records = service.generate_all().await?;
    let count = records.len();
    info!("Generated {} weather records", count);

    Ok(ApiResponse::created(json!({
        "success": true,
        "message": "Weather data generated",
        "data": records,
        "count": count,
    })))
}
