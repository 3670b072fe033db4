//! Atom Publishing Protocol with GData-style extensions.
//!
//! A complete implementation of an AtomPub publishing layer: the Atom
//! document model, strong-etag optimistic concurrency, a string-buffer
//! resource locator with a category/query grammar, a server-side protocol
//! dispatcher, and interchangeable local/remote client proxies.
//!
//! # Overview
//!
//! Business objects live behind [`store::ResourceAdapter`] implementations
//! registered per category term. The server gateway maps the four HTTP
//! verbs onto adapter CRUD operations; the client proxies offer the same
//! operations in-process or over the wire:
//!
//! - **Document model**: Entry/Feed with authors, links, text constructs,
//!   extension elements, and namespace bookkeeping
//! - **Optimistic concurrency**: strong etags carried as a `gd:etag`
//!   attribute and the `If-Match` precondition header
//! - **Query grammar**: `/-/` category segments, `/entry<id>` addressing,
//!   and a typed parameter bag over the query string
//! - **Dual serialization**: compact and pretty output from one event
//!   stream
//!
//! # Modules
//!
//! - [`types`] - Entry, Feed, and the Atom constructs they carry
//! - [`protocol`] - serialization, parsing, etags, wire constants
//! - [`locator`] - resource locator and query grammar
//! - [`store`] - adapter seam between the protocol and business objects
//! - [`server`] - protocol dispatcher and axum glue
//! - [`client`] - local and remote proxies behind one trait
//! - [`error`] - the closed failure taxonomy
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use atompub_http_rs::core::server::{gateway, Dispatcher, ServerConfig};
//! use atompub_http_rs::core::store::AdapterRegistry;
//!
//! let registry = Arc::new(AdapterRegistry::new());
//! registry.register("offer", Arc::new(OfferAdapter::new()));
//!
//! let dispatcher = Arc::new(Dispatcher::new(registry, ServerConfig::default()));
//! let app = gateway::router(dispatcher);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod locator;
pub mod protocol;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod types;

// Re-export commonly used types at the module root
pub use error::{AtomPubError, Result};
pub use locator::{QueryParameters, ResourceLocator};
pub use store::{AdapterRegistry, AtomResource, ResourceAdapter};
pub use types::{Entry, Feed};

#[cfg(feature = "client")]
pub use client::{LocalProxy, ProxyConfig, RemoteProxy, ResourceProxy};

#[cfg(feature = "server")]
pub use server::{ApiRequest, ApiResponse, Dispatcher, Method, ServerConfig};
