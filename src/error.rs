// HTTP API Error Types
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::services::WeatherError;

/// Error payload nested under `error` in every failure body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub timestamp: String,
    pub request_id: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, request_id: Option<&str>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            request_id: request_id.unwrap_or_default().to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "error": self })
    }
}

/// Handler-level error with a stable code and a client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error, data retrieval or generation
    DataError(String),

    // 500 Internal Server Error, anything unexpected
    InternalError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::DataError(_) => 500,
            ApiError::InternalError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::DataError(msg) => msg,
            ApiError::InternalError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "AUTH_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DataError(_) => "DATA_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self, request_id: Option<&str>) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.message(), request_id)
    }
}

impl ApiError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn data_error(message: impl Into<String>) -> Self {
        ApiError::DataError(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ApiError::InternalError(message.into())
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        // Log the real cause but return a stable message
        tracing::error!("Weather data error: {}", err);
        match err {
            WeatherError::Generation { .. } => ApiError::data_error("Failed to generate weather data"),
            WeatherError::Retrieval(_) => ApiError::data_error("Failed to retrieve weather data"),
            WeatherError::Statistics(_) => ApiError::data_error("Failed to compute weather statistics"),
            WeatherError::UnknownCity(id) => ApiError::data_error(format!("Unknown city id: {}", id)),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;

    #[test]
    fn codes_map_to_statuses() {
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::unauthorized("x").error_code(), "AUTH_ERROR");
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::data_error("x").status_code(), 500);
        assert_eq!(ApiError::validation_error("x").error_code(), "VALIDATION_ERROR");
        assert_eq!(ApiError::internal_error("x").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn weather_errors_hide_internal_detail() {
        let err: ApiError = WeatherError::Retrieval(StoreError::AllFailed(vec![1, 13])).into();
        assert_eq!(err.error_code(), "DATA_ERROR");
        assert_eq!(err.message(), "Failed to retrieve weather data");
    }

    #[test]
    fn error_body_carries_request_id() {
        let body = ApiError::not_found("Endpoint not found")
            .to_error_response(Some("req-1"))
            .to_json();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["request_id"], "req-1");
        assert!(body["error"]["timestamp"].is_string());

        let anonymous = ApiError::not_found("x").to_error_response(None);
        assert_eq!(anonymous.request_id, "");
    }
}
