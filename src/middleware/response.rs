use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::ApiError;

/// Headers carried by every response unless a handler overrides them
pub fn default_headers() -> BTreeMap<String, String> {
    [
        ("Content-Type", "application/json; charset=utf-8"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type,Authorization"),
        ("Access-Control-Allow-Methods", "GET,POST,OPTIONS"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Uniform handler output: status, JSON body and header overrides
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    /// Create a response with default headers
    pub fn with_status(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            body,
            headers: BTreeMap::new(),
        }
    }

    /// Create a 200 OK response
    pub fn ok(body: Value) -> Self {
        Self::with_status(200, body)
    }

    /// Create a 201 Created response
    pub fn created(body: Value) -> Self {
        Self::with_status(201, body)
    }

    /// `{success: true, data}` envelope with 200 OK
    pub fn success(data: impl Serialize) -> Self {
        Self::ok(json!({ "success": true, "data": data }))
    }

    /// Override or add a single header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn from_error(error: &ApiError, request_id: Option<&str>) -> Self {
        Self::with_status(error.status_code(), error.to_error_response(request_id).to_json())
    }

    /// Serialize into the gateway envelope, body as a JSON string
    pub fn into_gateway(self) -> GatewayResponse {
        // Header names are case-insensitive; an override replaces any spelling
        let mut headers = default_headers();
        for (name, value) in self.headers {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            headers.insert(name, value);
        }

        let body = serde_json::to_string(&self.body).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response body: {}", e);
            "{}".to_string()
        });

        GatewayResponse {
            status_code: self.status_code,
            body,
            headers,
        }
    }
}

/// Wire envelope `{statusCode, body, headers}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl GatewayResponse {
    /// Parse the body back into JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}
