//! HTTP host for the router.
//!
//! Every inbound request goes through a single fallback handler that builds a
//! gateway-style [`ApiRequest`], runs it through the [`ApiRouter`] and turns
//! the resulting envelope back into an HTTP response.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::middleware::GatewayResponse;
use crate::router::{ApiRequest, ApiRouter};

const REQUEST_ID_HEADER: &str = "x-request-id";
/// Carries the shared secret that proves claims came from the gateway
pub const FORWARD_SECRET_HEADER: &str = "x-authorizer-secret";

pub struct HostState {
    pub router: ApiRouter,
    /// Lowercase name of the claims header set by the gateway
    pub claims_header: String,
    /// Claims are only read when the request carries this secret
    pub forward_secret: Option<String>,
}

pub fn app(state: Arc<HostState>, request_logging: bool) -> Router {
    let router = Router::new().fallback(dispatch).with_state(state);

    if request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    }
}

async fn dispatch(
    State(state): State<Arc<HostState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request = to_api_request(&method, &uri, &headers, &state);
    to_http_response(state.router.handle(request).await)
}

/// Translate an HTTP request into the gateway shape the router expects
pub fn to_api_request(method: &Method, uri: &Uri, headers: &HeaderMap, state: &HostState) -> ApiRequest {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut request_context = json!({ "requestId": request_id });
    if let Some(authorizer) = forwarded_authorizer(headers, state) {
        request_context["authorizer"] = authorizer;
    }

    ApiRequest {
        http_method: method.as_str().to_string(),
        path: uri.path().to_string(),
        request_context,
        request_id: Some(request_id),
        auth_user: None,
    }
}

/// The claims header holds either an authorizer object (`claims` or `jwt`
/// key) or a bare claims map. It is trusted only next to the forward secret.
fn forwarded_authorizer(headers: &HeaderMap, state: &HostState) -> Option<Value> {
    let claims_header = state.claims_header.as_str();
    let raw = headers.get(claims_header)?.to_str().ok()?;

    let presented = headers.get(FORWARD_SECRET_HEADER).and_then(|v| v.to_str().ok());
    match (state.forward_secret.as_deref(), presented) {
        (Some(expected), Some(presented)) if secrets_match(expected, presented) => {}
        (None, _) => {
            warn!("Ignoring {} header: no forward secret configured", claims_header);
            return None;
        }
        _ => {
            warn!("Ignoring {} header without a valid forward secret", claims_header);
            return None;
        }
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring unparseable {} header: {}", claims_header, e);
            return None;
        }
    };

    let is_authorizer = value.get("claims").is_some() || value.get("jwt").is_some();
    Some(if is_authorizer { value } else { json!({ "claims": value }) })
}

fn secrets_match(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

pub fn to_http_response(envelope: GatewayResponse) -> Response {
    let status = StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Body::from(envelope.body)).into_response();

    for (name, value) in envelope.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!("Dropping invalid response header {}", name),
        }
    }

    response
}
