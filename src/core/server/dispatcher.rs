//! Verb-to-operation dispatch.
//!
//! A request walks a fixed pipeline: resolve the category and its adapter,
//! open the adapter's unit of work, apply the verb's operation, serialize
//! the result, then commit. Any failure along the way rolls the unit of
//! work back and maps the error onto a wire status. The unit of work is
//! closed exactly once per request, and commit happens only after the
//! response body has been fully serialized.
//!
//! | Verb | Operation | Success |
//! |------|-----------|---------|
//! | GET | `find` | 200, entry or feed body |
//! | POST | `insert` / `insert_batch` | 201 + `Location`, or 200 empty feed |
//! | PUT + `X-HTTP-Method-Override: POST` | treated as POST | as POST |
//! | PUT | `update` | 200, updated entry |
//! | DELETE | `delete` | 200, no body |

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::error::{AtomPubError, Result};
use crate::core::locator::{categories, decode_component, parameters, QueryParameters};
use crate::core::protocol::constants::{headers, status, ATOM_MEDIA_TYPE};
use crate::core::protocol::etag::parse_strong;
use crate::core::protocol::reader::{parse_body, parse_entry, ParsedDocument};
use crate::core::protocol::writer::{entry_to_bytes, feed_to_bytes};
use crate::core::server::config::ServerConfig;
use crate::core::server::message::{ApiRequest, ApiResponse, Method};
use crate::core::store::{AdapterRegistry, RequestContext, ResourceAdapter};
use crate::core::types::{Feed, Text};

/// The protocol front door. One instance serves the whole registry.
pub struct Dispatcher {
    registry: Arc<AdapterRegistry>,
    config: ServerConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<AdapterRegistry>, config: ServerConfig) -> Self {
        Dispatcher { registry, config }
    }

    /// Run one request to completion. Never returns `Err`; every failure
    /// becomes a response carrying the taxonomy status.
    pub async fn dispatch(&self, request: ApiRequest) -> ApiResponse {
        if self.config.enable_logging {
            debug!(method = %request.method, locator = %request.locator, "dispatching");
        }
        match self.run(&request).await {
            Ok(response) => response,
            Err(error) => {
                if self.config.enable_logging {
                    warn!(status = error.status(), %error, "dispatch failed");
                }
                error_response(&error)
            }
        }
    }

    async fn run(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let terms = categories(&request.locator)?;
        if terms.len() != 1 {
            return Err(AtomPubError::BadRequest(format!(
                "expected exactly one category, got {}",
                terms.len()
            )));
        }
        let term = terms[0].term.as_str();

        let adapter = self.registry.resolve(term).ok_or_else(|| {
            AtomPubError::Internal(format!("no adapter registered for category {term}"))
        })?;
        let ctx = RequestContext::new(request.principal.clone());
        let query = parameters(&request.locator)?;
        let method = effective_method(request);

        adapter.begin_work(&ctx).await?;
        let outcome = self
            .apply(request, method, term, adapter.as_ref(), &ctx, &query)
            .await;
        match outcome {
            Ok(response) => {
                adapter.commit_work(&ctx).await?;
                Ok(response)
            }
            Err(error) => {
                if let Err(rollback) = adapter.rollback_work(&ctx).await {
                    warn!(%rollback, "rollback failed after {error}");
                }
                Err(error)
            }
        }
    }

    /// Business logic plus serialization for one verb. The caller owns the
    /// unit of work around this.
    async fn apply(
        &self,
        request: &ApiRequest,
        method: Method,
        term: &str,
        adapter: &dyn ResourceAdapter,
        ctx: &RequestContext,
        query: &QueryParameters,
    ) -> Result<ApiResponse> {
        match method {
            Method::Get => self.apply_get(request, term, adapter, ctx, query).await,
            Method::Post => self.apply_post(request, adapter, ctx, query).await,
            Method::Put => self.apply_put(request, adapter, ctx, query).await,
            Method::Delete => self.apply_delete(request, adapter, ctx, query).await,
        }
    }

    async fn apply_get(
        &self,
        request: &ApiRequest,
        term: &str,
        adapter: &dyn ResourceAdapter,
        ctx: &RequestContext,
        query: &QueryParameters,
    ) -> Result<ApiResponse> {
        let objects = adapter.find(ctx, query).await?;

        if let Some(id) = &query.id {
            let object = objects.into_iter().next().ok_or_else(|| {
                AtomPubError::NotFound(format!("no {term} with id {id}"))
            })?;
            let entry = object.to_entry(true, query.style.as_deref())?;
            let body = entry_to_bytes(&entry, query.prettyprint)?;
            return Ok(atom_response(status::OK, body));
        }

        let mut feed = Feed::new()
            .with_id(request.locator.to_string())
            .with_title(Text::Plain(term.to_string()));
        for object in objects {
            feed.add_entry(object.to_entry(false, query.style.as_deref())?);
        }
        let body = feed_to_bytes(feed, query.prettyprint)?;
        Ok(atom_response(status::OK, body))
    }

    async fn apply_post(
        &self,
        request: &ApiRequest,
        adapter: &dyn ResourceAdapter,
        ctx: &RequestContext,
        query: &QueryParameters,
    ) -> Result<ApiResponse> {
        let prototype = adapter.prototype();
        match parse_body(&request.body)? {
            ParsedDocument::Entry(entry) => {
                let object = prototype.from_entry(&entry)?;
                let slug = match request.header(headers::SLUG) {
                    Some(raw) => Some(decode_component(raw)?),
                    None => None,
                };
                let stored = adapter.insert(ctx, object, slug.as_deref()).await?;
                let out = stored.to_entry(true, query.style.as_deref())?;
                let location = out.uri.clone();
                let body = entry_to_bytes(&out, query.prettyprint)?;
                let mut response = atom_response(status::CREATED, body);
                if let Some(location) = location {
                    response = response.with_header(headers::LOCATION, location);
                }
                Ok(response)
            }
            ParsedDocument::Feed(feed) => {
                let mut objects = Vec::with_capacity(feed.entries.len());
                for entry in &feed.entries {
                    objects.push(prototype.from_entry(entry)?);
                }
                adapter.insert_batch(ctx, objects).await?;
                let body = feed_to_bytes(Feed::new(), query.prettyprint)?;
                Ok(atom_response(status::OK, body))
            }
        }
    }

    async fn apply_put(
        &self,
        request: &ApiRequest,
        adapter: &dyn ResourceAdapter,
        ctx: &RequestContext,
        query: &QueryParameters,
    ) -> Result<ApiResponse> {
        let entry = parse_entry(&request.body)?;
        // The If-Match header takes precedence over the in-document etag.
        let etag = match request.header(headers::IF_MATCH) {
            Some(wire) => parse_strong(wire)?,
            None => entry.etag.clone().ok_or_else(|| {
                AtomPubError::PreconditionFailed(
                    "update requires an If-Match header or a document etag".to_string(),
                )
            })?,
        };
        let object = adapter.prototype().from_entry(&entry)?;
        let stored = adapter.update(ctx, object, &etag).await?;
        let out = stored.to_entry(true, query.style.as_deref())?;
        let body = entry_to_bytes(&out, query.prettyprint)?;
        Ok(atom_response(status::OK, body))
    }

    async fn apply_delete(
        &self,
        request: &ApiRequest,
        adapter: &dyn ResourceAdapter,
        ctx: &RequestContext,
        query: &QueryParameters,
    ) -> Result<ApiResponse> {
        let id = query.id.as_deref().ok_or_else(|| {
            AtomPubError::BadRequest("delete requires an entry id in the path".to_string())
        })?;
        let etag = match request.header(headers::IF_MATCH) {
            Some(wire) => parse_strong(wire)?,
            None => {
                return Err(AtomPubError::PreconditionFailed(
                    "delete requires an If-Match header".to_string(),
                ))
            }
        };
        adapter.delete(ctx, id, &etag).await?;
        Ok(ApiResponse::new(status::OK))
    }
}

/// The verb the request effectively carries, honoring the tunneled-POST
/// workaround for clients that cannot send POST bodies.
fn effective_method(request: &ApiRequest) -> Method {
    if request.method == Method::Put {
        if let Some(value) = request.header(headers::METHOD_OVERRIDE) {
            if value.eq_ignore_ascii_case("POST") {
                return Method::Post;
            }
        }
    }
    request.method
}

fn atom_response(status: u16, body: bytes::Bytes) -> ApiResponse {
    ApiResponse::new(status)
        .with_header(headers::CONTENT_TYPE, ATOM_MEDIA_TYPE)
        .with_body(body)
}

/// Map a taxonomy error onto the wire, attaching the authentication
/// challenge where the kind defines one.
pub fn error_response(error: &AtomPubError) -> ApiResponse {
    let mut response = ApiResponse::new(error.status())
        .with_header(headers::CONTENT_TYPE, "text/plain; charset=UTF-8")
        .with_body(error.to_string());
    if let Some(challenge) = error.challenge() {
        response = response.with_header(headers::WWW_AUTHENTICATE, challenge);
    }
    response
}
