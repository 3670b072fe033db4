//! In-process proxy.
//!
//! Resolves the adapter from the same registry the server dispatcher uses
//! and invokes it directly, with no serialization and no network. Each call
//! runs inside its own unit of work, mirroring the dispatcher's discipline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::core::client::ResourceProxy;
use crate::core::error::{AtomPubError, Result};
use crate::core::locator::QueryParameters;
use crate::core::store::{
    AdapterRegistry, AtomResource, Principal, RequestContext, ResourceAdapter,
};

/// Proxy that short-circuits the wire entirely.
pub struct LocalProxy {
    registry: Arc<AdapterRegistry>,
    category: String,
    principal: Option<Principal>,
}

impl LocalProxy {
    pub fn new(registry: Arc<AdapterRegistry>, category: impl Into<String>) -> Self {
        LocalProxy {
            registry,
            category: category.into(),
            principal: None,
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    fn adapter(&self) -> Result<Arc<dyn ResourceAdapter>> {
        self.registry.resolve(&self.category).ok_or_else(|| {
            AtomPubError::Internal(format!(
                "no adapter registered for category {}",
                self.category
            ))
        })
    }

    fn context(&self) -> RequestContext {
        RequestContext::new(self.principal.clone())
    }

    /// Close the unit of work opened by the caller: commit on success,
    /// roll back on failure.
    async fn close_work<T>(
        adapter: &dyn ResourceAdapter,
        ctx: &RequestContext,
        outcome: Result<T>,
    ) -> Result<T> {
        match outcome {
            Ok(value) => {
                adapter.commit_work(ctx).await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = adapter.rollback_work(ctx).await {
                    warn!(%rollback, "rollback failed: {error}");
                }
                Err(error)
            }
        }
    }
}

#[async_trait]
impl ResourceProxy for LocalProxy {
    async fn get(&self, query: &QueryParameters) -> Result<Vec<Box<dyn AtomResource>>> {
        let adapter = self.adapter()?;
        let ctx = self.context();
        adapter.begin_work(&ctx).await?;
        let outcome = adapter.find(&ctx, query).await;
        let objects = Self::close_work(adapter.as_ref(), &ctx, outcome).await?;
        if let Some(id) = &query.id {
            if objects.is_empty() {
                return Err(AtomPubError::NotFound(format!(
                    "no {} with id {id}",
                    self.category
                )));
            }
        }
        Ok(objects)
    }

    async fn insert(
        &self,
        object: Box<dyn AtomResource>,
        slug: Option<&str>,
    ) -> Result<Box<dyn AtomResource>> {
        let adapter = self.adapter()?;
        let ctx = self.context();
        adapter.begin_work(&ctx).await?;
        let outcome = adapter.insert(&ctx, object, slug).await;
        Self::close_work(adapter.as_ref(), &ctx, outcome).await
    }

    async fn insert_batch(
        &self,
        objects: Vec<Box<dyn AtomResource>>,
    ) -> Result<Vec<Box<dyn AtomResource>>> {
        let adapter = self.adapter()?;
        let ctx = self.context();
        adapter.begin_work(&ctx).await?;
        let outcome = adapter.insert_batch(&ctx, objects).await;
        Self::close_work(adapter.as_ref(), &ctx, outcome).await
    }

    async fn update(&self, object: Box<dyn AtomResource>) -> Result<Box<dyn AtomResource>> {
        let etag = object.etag().ok_or_else(|| {
            AtomPubError::PreconditionFailed("update requires an etag on the object".to_string())
        })?;
        let adapter = self.adapter()?;
        let ctx = self.context();
        adapter.begin_work(&ctx).await?;
        let outcome = adapter.update(&ctx, object, &etag).await;
        Self::close_work(adapter.as_ref(), &ctx, outcome).await
    }

    async fn delete(&self, id: &str, etag: &str) -> Result<()> {
        let adapter = self.adapter()?;
        let ctx = self.context();
        adapter.begin_work(&ctx).await?;
        let outcome = adapter.delete(&ctx, id, etag).await;
        Self::close_work(adapter.as_ref(), &ctx, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unregistered_category_is_internal() {
        let proxy = LocalProxy::new(Arc::new(AdapterRegistry::new()), "offer");
        let result = proxy.get(&QueryParameters::new()).await;
        assert!(matches!(result, Err(AtomPubError::Internal(_))));
    }
}
