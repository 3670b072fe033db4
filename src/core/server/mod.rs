//! Server-side protocol gateway.
//!
//! The gateway exposes every registered category under one URL space and
//! maps the four verbs onto adapter CRUD operations. The dispatch core is
//! independent of any HTTP runtime; axum glue lives behind the `server`
//! feature.
//!
//! # Module Organization
//!
//! ```text
//! server/
//! ├── message      - ApiRequest / ApiResponse runtime-agnostic pair
//! ├── config       - ServerConfig options
//! ├── dispatcher   - verb-to-CRUD state machine
//! └── gateway      - axum Router glue (feature "server")
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Dispatcher`] | Resolves category, runs the unit of work, serializes |
//! | [`ApiRequest`] / [`ApiResponse`] | Runtime-agnostic message pair |
//! | [`ServerConfig`] | Realm and logging options |
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use atompub_http_rs::core::server::{ApiRequest, Dispatcher, Method, ServerConfig};
//! use atompub_http_rs::core::locator::ResourceLocator;
//! use atompub_http_rs::core::store::AdapterRegistry;
//!
//! # async fn demo() {
//! let registry = Arc::new(AdapterRegistry::new());
//! let dispatcher = Dispatcher::new(registry, ServerConfig::default());
//!
//! let locator = ResourceLocator::parse("http://shop.example.com/gateway/-/offer").unwrap();
//! let response = dispatcher.dispatch(ApiRequest::new(Method::Get, locator)).await;
//! // No adapter registered for "offer": the gateway answers 500.
//! assert_eq!(response.status, 500);
//! # }
//! ```

mod config;
mod dispatcher;
mod message;

pub mod gateway;

pub use config::ServerConfig;
pub use dispatcher::{error_response, Dispatcher};
pub use message::{ApiRequest, ApiResponse, Method};
