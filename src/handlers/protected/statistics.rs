// handlers/protected/statistics.rs - GET /weather/statistics handler

use std::sync::Arc;

use crate::middleware::ApiResponse;
use crate::router::{ApiRequest, HandlerResult};
use crate::services::WeatherService;

/// GET /weather/statistics - Distribution and mean rainfall over the latest readings
pub async fn statistics(service: Arc<WeatherService>, request: ApiRequest) -> HandlerResult {
    if let Some(user) = &request.auth_user {
        tracing::debug!("Statistics requested by {}", user.sub);
    }

    let statistics = service.get_statistics().await?;
    Ok(ApiResponse::success(statistics))
}
