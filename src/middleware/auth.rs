use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::router::{ApiRequest, Handler, HandlerResult};
use crate::services::WeatherService;

/// Authenticated user context derived from gateway claims
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthUser {
    pub sub: String,
    pub email: String,
    pub username: String,
}

impl AuthUser {
    pub fn from_claims(claims: &Map<String, Value>) -> Self {
        let claim = |name: &str| {
            claims
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            sub: claim("sub"),
            email: claim("email"),
            username: claim("cognito:username"),
        }
    }
}

/// Find the pre-validated claims map in a request context.
///
/// REST-style gateways attach `authorizer.claims`; HTTP-style gateways nest
/// them as `authorizer.jwt.claims`. Empty maps count as missing.
pub fn extract_claims(request_context: &Value) -> Option<&Map<String, Value>> {
    let authorizer = request_context.get("authorizer")?;

    fn non_empty(value: Option<&Value>) -> Option<&Map<String, Value>> {
        value.and_then(Value::as_object).filter(|m| !m.is_empty())
    }

    non_empty(authorizer.get("claims"))
        .or_else(|| non_empty(authorizer.get("jwt").and_then(|jwt| jwt.get("claims"))))
}

pub fn is_authenticated(request: &ApiRequest) -> bool {
    extract_claims(&request.request_context).is_some()
}

/// Handler wrapper that rejects requests without claims
pub struct RequireAuth<H> {
    inner: H,
}

/// Gate a handler behind claims authentication
pub fn require_auth<H: Handler>(handler: H) -> RequireAuth<H> {
    RequireAuth { inner: handler }
}

#[async_trait]
impl<H: Handler> Handler for RequireAuth<H> {
    async fn call(&self, service: Arc<WeatherService>, mut request: ApiRequest) -> HandlerResult {
        let user = match extract_claims(&request.request_context) {
            Some(claims) => AuthUser::from_claims(claims),
            None => {
                warn!("Unauthenticated access attempt to {}", request.path);
                return Err(ApiError::unauthorized("Authentication required"));
            }
        };

        debug!("Authenticated {} for {}", user.sub, request.path);
        request.auth_user = Some(user);
        self.inner.call(service, request).await
    }
}
