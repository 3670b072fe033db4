//! Client proxies.
//!
//! One interface, two interchangeable implementations: [`LocalProxy`] calls
//! the adapter in-process through the registry, [`RemoteProxy`] speaks the
//! wire protocol against a remote gateway. Code written against
//! [`ResourceProxy`] cannot tell them apart.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── config   - ProxyConfig and the shared config cell
//! ├── local    - in-process proxy over the adapter registry
//! └── remote   - reqwest proxy over the wire protocol
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use atompub_http_rs::core::client::{ProxyConfig, RemoteProxy, ResourceProxy};
//! use atompub_http_rs::core::locator::QueryParameters;
//! # use atompub_http_rs::core::store::AtomResource;
//!
//! # async fn demo(prototype: Box<dyn AtomResource>) -> atompub_http_rs::core::error::Result<()> {
//! let config = ProxyConfig::new("http://shop.example.com/gateway", "offer")?
//!     .with_credentials("alice", "secret");
//! let proxy = RemoteProxy::new(config, prototype)?;
//!
//! let mut query = QueryParameters::new();
//! query.max_results = 10;
//! let offers = proxy.get(&query).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod local;
mod remote;

pub use config::{ConfigListener, Credentials, ProxyConfig, SharedProxyConfig};
pub use local::LocalProxy;
pub use remote::RemoteProxy;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::locator::QueryParameters;
use crate::core::store::AtomResource;

/// The proxy contract. Stateless per call; one configured instance may be
/// shared across tasks.
#[async_trait]
pub trait ResourceProxy: Send + Sync {
    /// Objects matching the query. A query carrying an entry id that
    /// matches nothing is `NotFound`; an empty collection query is an
    /// empty vector.
    async fn get(&self, query: &QueryParameters) -> Result<Vec<Box<dyn AtomResource>>>;

    /// Store one new object, with an optional naming hint. Returns the
    /// stored object carrying its fresh etag.
    async fn insert(
        &self,
        object: Box<dyn AtomResource>,
        slug: Option<&str>,
    ) -> Result<Box<dyn AtomResource>>;

    /// Store a batch in one call, preserving request order.
    async fn insert_batch(
        &self,
        objects: Vec<Box<dyn AtomResource>>,
    ) -> Result<Vec<Box<dyn AtomResource>>>;

    /// Update an existing object. The precondition etag is taken from the
    /// object itself; a missing etag is `PreconditionFailed`.
    async fn update(&self, object: Box<dyn AtomResource>) -> Result<Box<dyn AtomResource>>;

    /// Delete by id under the given etag precondition.
    async fn delete(&self, id: &str, etag: &str) -> Result<()>;
}
