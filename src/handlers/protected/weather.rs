// handlers/protected/weather.rs - latest readings per city

use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::middleware::ApiResponse;
use crate::models::WeatherRecord;
use crate::router::{ApiRequest, HandlerResult};
use crate::services::WeatherService;

fn listing(records: Vec<WeatherRecord>) -> ApiResponse {
    let count = records.len();
    ApiResponse::ok(json!({
        "success": true,
        "data": records,
        "count": count,
    }))
}

/// GET /weather - Latest reading of every city.
///
/// An empty table triggers one generation pass followed by a single re-read.
pub async fn current_weather(service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    let mut records = service.get_current().await?;

    if records.is_empty() {
        info!("No weather data stored, generating a batch");
        service.generate_all().await?;
        records = service.get_current().await?;
    }

    Ok(listing(records))
}

/// GET /weather/forecast - Forecast view of every city
pub async fn forecast(service: Arc<WeatherService>, _request: ApiRequest) -> HandlerResult {
    let records = service.get_forecast().await?;
    Ok(listing(records))
}
