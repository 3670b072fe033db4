//! Axum glue for the dispatcher.
//!
//! The dispatcher itself is runtime-agnostic; this module adapts axum's
//! request/response types onto [`ApiRequest`]/[`ApiResponse`] and wires a
//! catch-all route so every path under the mount point reaches the
//! dispatcher. Basic credentials are decoded here and handed to the
//! dispatcher as the request principal.
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use atompub_http_rs::core::server::{gateway, Dispatcher, ServerConfig};
//! use atompub_http_rs::core::store::AdapterRegistry;
//!
//! let registry = Arc::new(AdapterRegistry::new());
//! let dispatcher = Arc::new(Dispatcher::new(registry, ServerConfig::default()));
//! let app = gateway::router(dispatcher);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::routing::any;
use axum::Router;
use base64::prelude::*;

use crate::core::error::{AtomPubError, Result};
use crate::core::locator::ResourceLocator;
use crate::core::protocol::constants::headers;
use crate::core::server::dispatcher::{error_response, Dispatcher};
use crate::core::server::message::{ApiRequest, ApiResponse, Method};
use crate::core::store::Principal;

/// Largest accepted request body, in bytes.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// A router whose every route is the protocol gateway.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .fallback(any(handle))
        .with_state(dispatcher)
}

async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response<Body> {
    let api_request = match adapt_request(request).await {
        Ok(api_request) => api_request,
        Err(error) => return adapt_response(error_response(&error)),
    };
    adapt_response(dispatcher.dispatch(api_request).await)
}

/// Rebuild the protocol request from the hosting runtime's pieces. The
/// locator is reconstructed as an absolute URL from the `Host` header.
async fn adapt_request(request: Request<Body>) -> Result<ApiRequest> {
    let method = Method::from_str(request.method().as_str())?;

    let host = request
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let locator = ResourceLocator::parse(&format!("http://{host}{path_and_query}"))?;

    let mut api_request = ApiRequest::new(method, locator);
    for (name, value) in request.headers() {
        if let Ok(value) = value.to_str() {
            api_request
                .headers
                .insert(name.as_str().to_string(), value.to_string());
        }
    }

    if let Some(authorization) = api_request.header(headers::AUTHORIZATION) {
        api_request.principal = Some(basic_principal(authorization)?);
    }

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| AtomPubError::BadRequest(format!("unreadable body: {e}")))?;
    Ok(api_request.with_body(body))
}

fn adapt_response(api_response: ApiResponse) -> Response<Body> {
    let status =
        StatusCode::from_u16(api_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &api_response.headers {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(api_response.body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Decode `Authorization: Basic <base64(user:password)>` into a principal.
/// The password is not verified here; credential checks belong to the
/// adapter behind the category.
fn basic_principal(authorization: &str) -> Result<Principal> {
    let encoded = authorization
        .strip_prefix("Basic ")
        .ok_or_else(|| AtomPubError::BadRequest("unsupported authorization scheme".to_string()))?;
    let decoded = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|_| AtomPubError::BadRequest("malformed Basic credentials".to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AtomPubError::BadRequest("malformed Basic credentials".to_string()))?;
    let name = decoded
        .split_once(':')
        .map(|(user, _)| user)
        .unwrap_or(&decoded);
    Ok(Principal::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_principal_decodes_user() {
        let header = format!("Basic {}", BASE64_STANDARD.encode("alice:secret"));
        let principal = basic_principal(&header).unwrap();
        assert_eq!(principal.name, "alice");
    }

    #[test]
    fn test_non_basic_scheme_rejected() {
        assert!(basic_principal("Bearer token").is_err());
    }

    #[tokio::test]
    async fn test_adapt_request_rebuilds_locator() {
        let request = Request::builder()
            .method("GET")
            .uri("/gateway/-/offer?style=full")
            .header("host", "shop.example.com:8080")
            .body(Body::empty())
            .unwrap();
        let api_request = adapt_request(request).await.unwrap();
        assert_eq!(
            api_request.locator.to_string(),
            "http://shop.example.com:8080/gateway/-/offer?style=full"
        );
    }
}
