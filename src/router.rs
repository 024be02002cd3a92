//! Route dispatch for gateway-style requests.
//!
//! Routes are exact `"<METHOD> <path>"` keys resolved against a map built
//! once at startup. Every outcome, including handler errors and panics, is
//! normalized into a [`GatewayResponse`].

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::auth::{require_auth, AuthUser};
use crate::middleware::response::{ApiResponse, GatewayResponse};
use crate::services::WeatherService;

pub type HandlerResult = Result<ApiResponse, ApiError>;

/// Inbound request as delivered by the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Framework-supplied context; the authorizer claims live here
    #[serde(default)]
    pub request_context: Value,
    /// Correlation id assigned by the host
    #[serde(skip)]
    pub request_id: Option<String>,
    /// Set by the auth gate once claims are accepted
    #[serde(skip)]
    pub auth_user: Option<AuthUser>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

impl ApiRequest {
    pub fn correlation_id(&self) -> Option<&str> {
        self.request_id
            .as_deref()
            .or_else(|| self.request_context.get("requestId").and_then(Value::as_str))
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, service: Arc<WeatherService>, request: ApiRequest) -> HandlerResult;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Arc<WeatherService>, ApiRequest) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, service: Arc<WeatherService>, request: ApiRequest) -> HandlerResult {
        (self)(service, request).await
    }
}

/// Exact `(method, path)` key; no case folding or trailing-slash handling
pub fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method, path)
}

pub struct RouterBuilder {
    service: Arc<WeatherService>,
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl RouterBuilder {
    /// Register a handler. The path also answers CORS preflight requests.
    pub fn route(mut self, method: &str, path: &str, handler: impl Handler + 'static) -> Self {
        self.routes.insert(route_key(method, path), Arc::new(handler));
        self.routes
            .entry(route_key("OPTIONS", path))
            .or_insert_with(|| Arc::new(public::options) as Arc<dyn Handler>);
        self
    }

    pub fn build(self) -> ApiRouter {
        ApiRouter {
            service: self.service,
            routes: self.routes,
            not_found: Arc::new(public::not_found),
        }
    }
}

pub struct ApiRouter {
    service: Arc<WeatherService>,
    routes: HashMap<String, Arc<dyn Handler>>,
    not_found: Arc<dyn Handler>,
}

impl ApiRouter {
    pub fn builder(service: Arc<WeatherService>) -> RouterBuilder {
        RouterBuilder {
            service,
            routes: HashMap::new(),
        }
    }

    /// The weather API route table
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self::builder(service)
            // Public
            .route("GET", "/health", public::health)
            .route("GET", "/weather/types", public::weather_types)
            .route("POST", "/weather/generate", public::generate_weather)
            // Protected
            .route("GET", "/weather", require_auth(protected::current_weather))
            .route("GET", "/weather/forecast", require_auth(protected::forecast))
            .route("GET", "/weather/statistics", require_auth(protected::statistics))
            .build()
    }

    pub fn service(&self) -> &Arc<WeatherService> {
        &self.service
    }

    /// Registered route keys, sorted
    pub fn route_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub async fn handle(&self, request: ApiRequest) -> GatewayResponse {
        let key = route_key(&request.http_method, &request.path);
        let request_id = request.correlation_id().map(str::to_string);
        info!("Received {} (request {})", key, request_id.as_deref().unwrap_or("-"));

        let handler = self.routes.get(&key).unwrap_or(&self.not_found).clone();
        let outcome = AssertUnwindSafe(handler.call(self.service.clone(), request))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!("{} failed with {}: {}", key, err.error_code(), err);
                ApiResponse::from_error(&err, request_id.as_deref())
            }
            Err(_) => {
                error!("Unhandled error while serving {}", key);
                let err = ApiError::internal_error("Internal server error");
                ApiResponse::from_error(&err, request_id.as_deref())
            }
        };

        response.into_gateway()
    }
}
