//! HTTP proxy over reqwest.
//!
//! Builds a category locator from the configured base, serializes the
//! request document, performs the exchange, and parses the reply back into
//! business objects through the prototype's `from_entry`. Callers only ever
//! see the fixed failure taxonomy: a non-2xx reply is reclassified by its
//! status code, and a transport failure with no response at all collapses
//! to `Internal`.
//!
//! Inserts use the tunneled-POST workaround: the request goes out as PUT
//! carrying `X-HTTP-Method-Override: POST`, because some intermediaries
//! mishandle POST bodies under Basic authentication.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::*;
use bytes::Bytes;
use tracing::debug;

use crate::core::client::config::{ProxyConfig, SharedProxyConfig};
use crate::core::client::ResourceProxy;
use crate::core::error::{AtomPubError, Result};
use crate::core::locator::{encode_component, QueryParameters, ResourceLocator, CATEGORY_MARKER};
use crate::core::protocol::constants::{headers, ATOM_MEDIA_TYPE, PROTOCOL_VERSION};
use crate::core::protocol::etag::make_strong;
use crate::core::protocol::reader::{parse_body, parse_entry, parse_feed, ParsedDocument};
use crate::core::protocol::writer::{entry_to_bytes, feed_to_bytes};
use crate::core::store::AtomResource;
use crate::core::types::Feed;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Proxy that speaks the wire protocol against a remote gateway.
pub struct RemoteProxy {
    client: reqwest::Client,
    config: Arc<SharedProxyConfig>,
    prototype: Box<dyn AtomResource>,
}

impl RemoteProxy {
    /// Create a proxy with a fresh HTTP client and a default timeout. A
    /// timed-out call surfaces as `Internal`, never as a hang. Client
    /// construction itself can fail (TLS backend initialization) and is
    /// reported the same way.
    pub fn new(config: ProxyConfig, prototype: Box<dyn AtomResource>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AtomPubError::Internal(format!("http client construction: {e}")))?;
        Ok(Self::with_client(client, config, prototype))
    }

    /// Create a proxy wrapping an existing reqwest client.
    pub fn with_client(
        client: reqwest::Client,
        config: ProxyConfig,
        prototype: Box<dyn AtomResource>,
    ) -> Self {
        RemoteProxy {
            client,
            config: Arc::new(SharedProxyConfig::new(config)),
            prototype,
        }
    }

    /// The shared configuration cell, for callers that rotate credentials
    /// or cookies while the proxy is in use.
    pub fn config(&self) -> Arc<SharedProxyConfig> {
        self.config.clone()
    }

    /// The category locator this proxy addresses, per current config.
    fn locator(config: &ProxyConfig) -> Result<ResourceLocator> {
        ResourceLocator::parse(&format!(
            "{}{}{}",
            config.base,
            CATEGORY_MARKER,
            encode_component(&config.category)
        ))
    }

    fn decorate(
        &self,
        mut builder: reqwest::RequestBuilder,
        config: &ProxyConfig,
    ) -> reqwest::RequestBuilder {
        builder = builder.header(headers::GDATA_VERSION, PROTOCOL_VERSION);
        if let Some(credentials) = &config.credentials {
            let token =
                BASE64_STANDARD.encode(format!("{}:{}", credentials.username, credentials.password));
            builder = builder.header(headers::AUTHORIZATION, format!("Basic {token}"));
        }
        if !config.cookies.is_empty() {
            builder = builder.header(headers::COOKIE, config.cookies.join("; "));
        }
        builder
    }

    /// Perform the exchange and return the success body, reclassifying
    /// every failure into the taxonomy.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Bytes> {
        let response = builder
            .send()
            .await
            .map_err(|e| AtomPubError::Internal(format!("transport failure: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AtomPubError::Internal(format!("unreadable response body: {e}")))?;
        if !(200..300).contains(&status) {
            let message = String::from_utf8_lossy(&body).into_owned();
            return Err(AtomPubError::from_status(status, message));
        }
        Ok(body)
    }
}

#[async_trait]
impl ResourceProxy for RemoteProxy {
    async fn get(&self, query: &QueryParameters) -> Result<Vec<Box<dyn AtomResource>>> {
        let config = self.config.snapshot();
        let mut locator = Self::locator(&config)?;
        query.apply_to(&mut locator)?;
        debug!(%locator, "remote get");

        let builder = self.decorate(self.client.get(locator.to_string()), &config);
        let body = self.execute(builder).await?;

        match parse_body(&body)? {
            ParsedDocument::Entry(entry) => Ok(vec![self.prototype.from_entry(&entry)?]),
            ParsedDocument::Feed(feed) => feed
                .entries
                .iter()
                .map(|entry| self.prototype.from_entry(entry))
                .collect(),
        }
    }

    async fn insert(
        &self,
        object: Box<dyn AtomResource>,
        slug: Option<&str>,
    ) -> Result<Box<dyn AtomResource>> {
        let config = self.config.snapshot();
        let locator = Self::locator(&config)?;
        let entry = object.to_entry(true, None)?;
        let body = entry_to_bytes(&entry, false)?;
        debug!(%locator, "remote insert");

        let mut builder = self
            .client
            .put(locator.to_string())
            .header(headers::METHOD_OVERRIDE, "POST")
            .header(headers::CONTENT_TYPE, ATOM_MEDIA_TYPE)
            .body(body);
        if let Some(slug) = slug {
            builder = builder.header(headers::SLUG, encode_component(slug));
        }
        let builder = self.decorate(builder, &config);

        let reply = self.execute(builder).await?;
        self.prototype.from_entry(&parse_entry(&reply)?)
    }

    async fn insert_batch(
        &self,
        objects: Vec<Box<dyn AtomResource>>,
    ) -> Result<Vec<Box<dyn AtomResource>>> {
        let config = self.config.snapshot();
        let locator = Self::locator(&config)?;

        let mut feed = Feed::new();
        for object in &objects {
            feed.add_entry(object.to_entry(false, None)?);
        }
        let body = feed_to_bytes(feed, false)?;
        debug!(%locator, count = objects.len(), "remote batch insert");

        let builder = self
            .client
            .put(locator.to_string())
            .header(headers::METHOD_OVERRIDE, "POST")
            .header(headers::CONTENT_TYPE, ATOM_MEDIA_TYPE)
            .body(body);
        let builder = self.decorate(builder, &config);

        // The gateway acknowledges a batch with an empty feed; any entries
        // it does return are parsed back.
        let reply = self.execute(builder).await?;
        parse_feed(&reply)?
            .entries
            .iter()
            .map(|entry| self.prototype.from_entry(entry))
            .collect()
    }

    async fn update(&self, object: Box<dyn AtomResource>) -> Result<Box<dyn AtomResource>> {
        let etag = object.etag().ok_or_else(|| {
            AtomPubError::PreconditionFailed("update requires an etag on the object".to_string())
        })?;
        let config = self.config.snapshot();
        let locator = Self::locator(&config)?;
        let entry = object.to_entry(true, None)?;
        let body = entry_to_bytes(&entry, false)?;
        debug!(%locator, "remote update");

        let builder = self
            .client
            .put(locator.to_string())
            .header(headers::IF_MATCH, make_strong(&etag))
            .header(headers::CONTENT_TYPE, ATOM_MEDIA_TYPE)
            .body(body);
        let builder = self.decorate(builder, &config);

        let reply = self.execute(builder).await?;
        self.prototype.from_entry(&parse_entry(&reply)?)
    }

    async fn delete(&self, id: &str, etag: &str) -> Result<()> {
        let config = self.config.snapshot();
        let mut locator = Self::locator(&config)?;
        let query = QueryParameters {
            id: Some(id.to_string()),
            ..QueryParameters::new()
        };
        query.apply_to(&mut locator)?;
        debug!(%locator, "remote delete");

        let builder = self
            .client
            .delete(locator.to_string())
            .header(headers::IF_MATCH, make_strong(etag));
        let builder = self.decorate(builder, &config);

        self.execute(builder).await?;
        Ok(())
    }
}
