//! The pluggable business-object store contract.
//!
//! The protocol layer does not persist anything itself. Applications supply,
//! per category term, an adapter implementing storage-backed CRUD and the
//! Entry⇄object conversion. Adapters are resolved through an explicit
//! [`AdapterRegistry`] built at startup and injected into the dispatcher and
//! the local proxy — one category, one adapter.
//!
//! # Unit-of-work discipline
//!
//! Exactly one store-level unit of work runs per request: opened with
//! [`ResourceAdapter::begin_work`] before business logic, committed only
//! after the response is fully serialized, rolled back on every other
//! terminal path. Adapters must not open nested units of work against the
//! same store resource.
//!
//! # Concurrency
//!
//! Adapters must be safe for many concurrent requests; the protocol layer
//! shares no per-request state and holds no long-lived references to
//! business objects.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::core::error::{AtomPubError, Result};
use crate::core::locator::QueryParameters;
use crate::core::types::Entry;

/// The caller's authenticated identity, propagated to the adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Principal { name: name.into() }
    }
}

/// Per-request context handed to every adapter operation.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
}

impl RequestContext {
    pub fn new(principal: Option<Principal>) -> Self {
        RequestContext { principal }
    }

    pub fn anonymous() -> Self {
        RequestContext { principal: None }
    }
}

/// One business object: an opaque id, an etag, and Entry conversion.
///
/// `from_entry` is pure — it builds a new object and does not mutate the
/// receiver. `set_clean` marks the object as persisted after a successful
/// store write.
pub trait AtomResource: Send + Sync {
    /// Opaque server-assigned identifier; `None` before first persistence.
    fn id(&self) -> Option<String>;

    /// Current raw etag value; `None` only for a not-yet-created object.
    fn etag(&self) -> Option<String>;

    /// Convert to an Entry at the requested presentation style. `is_root`
    /// selects whether the entry carries root namespace declarations.
    fn to_entry(&self, is_root: bool, style: Option<&str>) -> Result<Entry>;

    /// Build a new object of the same type from a wire entry.
    fn from_entry(&self, entry: &Entry) -> Result<Box<dyn AtomResource>>;

    /// Mark the object persisted.
    fn set_clean(&mut self);
}

/// Storage-backed CRUD for one category.
///
/// Every operation defaults to [`AtomPubError::MethodNotAllowed`], so an
/// adapter implements exactly the verbs its store supports. The etag
/// arguments carry *raw* (already unquoted) values; comparing them against
/// the store's current value and failing with `PreconditionFailed` on
/// mismatch is the adapter's responsibility.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// A conversion prototype: an empty object whose `from_entry` builds
    /// real instances. Replaces the reflective bean instantiation of the
    /// original design.
    fn prototype(&self) -> Box<dyn AtomResource>;

    /// Open the request's unit of work.
    async fn begin_work(&self, _ctx: &RequestContext) -> Result<()> {
        Ok(())
    }

    /// Commit the request's unit of work. Called only once the response is
    /// fully serialized.
    async fn commit_work(&self, _ctx: &RequestContext) -> Result<()> {
        Ok(())
    }

    /// Roll back the request's unit of work.
    async fn rollback_work(&self, _ctx: &RequestContext) -> Result<()> {
        Ok(())
    }

    /// Objects matching the query. An empty result for a collection query
    /// is not an error; the dispatcher turns an id-miss into 404.
    async fn find(
        &self,
        _ctx: &RequestContext,
        _query: &QueryParameters,
    ) -> Result<Vec<Box<dyn AtomResource>>> {
        Err(AtomPubError::MethodNotAllowed("find".to_string()))
    }

    /// Store one new object, honoring an optional client naming hint.
    /// Returns the stored object carrying its fresh etag.
    async fn insert(
        &self,
        _ctx: &RequestContext,
        _object: Box<dyn AtomResource>,
        _slug: Option<&str>,
    ) -> Result<Box<dyn AtomResource>> {
        Err(AtomPubError::MethodNotAllowed("insert".to_string()))
    }

    /// Store a batch in one call, preserving request order in the reply.
    /// The adapter owns whatever transactional semantics it provides.
    async fn insert_batch(
        &self,
        _ctx: &RequestContext,
        _objects: Vec<Box<dyn AtomResource>>,
    ) -> Result<Vec<Box<dyn AtomResource>>> {
        Err(AtomPubError::MethodNotAllowed("insert_batch".to_string()))
    }

    /// Update an existing object under the given etag precondition.
    async fn update(
        &self,
        _ctx: &RequestContext,
        _object: Box<dyn AtomResource>,
        _etag: &str,
    ) -> Result<Box<dyn AtomResource>> {
        Err(AtomPubError::MethodNotAllowed("update".to_string()))
    }

    /// Delete by id under the given etag precondition.
    async fn delete(&self, _ctx: &RequestContext, _id: &str, _etag: &str) -> Result<()> {
        Err(AtomPubError::MethodNotAllowed("delete".to_string()))
    }
}

/// Startup-built map from category term to adapter.
///
/// Read-mostly: requests resolve concurrently while registration (rare)
/// takes the exclusive lock.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<BTreeMap<String, Arc<dyn ResourceAdapter>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        AdapterRegistry::default()
    }

    /// Bind a category term to its adapter. One category, one adapter; a
    /// re-registration replaces the previous binding.
    pub fn register(&self, term: impl Into<String>, adapter: Arc<dyn ResourceAdapter>) {
        let mut adapters = match self.adapters.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        adapters.insert(term.into(), adapter);
    }

    /// Resolve the adapter for a category term.
    pub fn resolve(&self, term: &str) -> Option<Arc<dyn ResourceAdapter>> {
        let adapters = match self.adapters.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        adapters.get(term).cloned()
    }

    /// Registered category terms, in order.
    pub fn terms(&self) -> Vec<String> {
        let adapters = match self.adapters.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        adapters.keys().cloned().collect()
    }
}
