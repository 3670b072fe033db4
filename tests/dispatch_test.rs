//! End-to-end dispatch scenarios against an in-memory adapter.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use atompub_http_rs::core::client::{LocalProxy, ResourceProxy};
use atompub_http_rs::core::error::{AtomPubError, Result};
use atompub_http_rs::core::locator::{QueryParameters, ResourceLocator};
use atompub_http_rs::core::protocol::{
    entry_to_bytes, etag_from_version, feed_to_bytes, parse_entry, parse_feed, version_from_etag,
};
use atompub_http_rs::core::server::{ApiRequest, Dispatcher, Method, ServerConfig};
use atompub_http_rs::core::store::{
    AdapterRegistry, AtomResource, RequestContext, ResourceAdapter,
};
use atompub_http_rs::core::types::{Entry, Feed, Text};

const GATEWAY: &str = "http://shop.example.com/gateway";

#[derive(Clone, Debug, Default)]
struct Offer {
    id: Option<String>,
    version: u64,
    name: String,
}

impl Offer {
    fn named(name: &str) -> Self {
        Offer {
            id: None,
            version: 0,
            name: name.to_string(),
        }
    }

    fn stored(id: &str, version: u64, name: &str) -> Self {
        Offer {
            id: Some(id.to_string()),
            version,
            name: name.to_string(),
        }
    }

    fn from_entry_concrete(entry: &Entry) -> Result<Offer> {
        let id = entry
            .id
            .as_deref()
            .and_then(|raw| raw.strip_prefix("urn:offer:"))
            .map(str::to_string);
        let version = match &entry.etag {
            Some(etag) => version_from_etag(etag)?,
            None => 0,
        };
        let name = match &entry.title {
            Some(title) => title.format()?.to_string(),
            None => String::new(),
        };
        Ok(Offer { id, version, name })
    }
}

impl AtomResource for Offer {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn etag(&self) -> Option<String> {
        (self.version > 0).then(|| etag_from_version(self.version))
    }

    fn to_entry(&self, _is_root: bool, style: Option<&str>) -> Result<Entry> {
        let mut entry = Entry::new().with_title(Text::plain(self.name.clone()));
        if let Some(id) = &self.id {
            entry = entry
                .with_id(format!("urn:offer:{id}"))
                .with_uri(format!("{GATEWAY}/-/offer/entry{id}"));
        }
        if let Some(etag) = self.etag() {
            entry = entry.with_etag(etag);
        }
        if style != Some("short") {
            entry = entry.with_summary(Text::plain(format!("offer: {}", self.name)));
        }
        Ok(entry)
    }

    fn from_entry(&self, entry: &Entry) -> Result<Box<dyn AtomResource>> {
        Ok(Box::new(Offer::from_entry_concrete(entry)?))
    }

    fn set_clean(&mut self) {}
}

#[derive(Default)]
struct OfferAdapter {
    store: Mutex<BTreeMap<String, Offer>>,
    next_id: AtomicU64,
}

impl OfferAdapter {
    fn seed(&self, offer: Offer) {
        let id = offer.id.clone().expect("seeded offer needs an id");
        self.store.lock().unwrap().insert(id, offer);
    }

    fn snapshot(&self, id: &str) -> Option<Offer> {
        self.store.lock().unwrap().get(id).cloned()
    }

    /// Rebuild the concrete type from the trait object via its Entry form.
    fn concrete(object: &dyn AtomResource) -> Result<Offer> {
        Offer::from_entry_concrete(&object.to_entry(true, None)?)
    }

    fn store_new(&self, object: &dyn AtomResource, slug: Option<&str>) -> Result<Offer> {
        let mut offer = Self::concrete(object)?;
        let id = match slug {
            Some(slug) => slug.replace(' ', "-"),
            None => self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
        };
        offer.id = Some(id.clone());
        offer.version = 1;
        self.store.lock().unwrap().insert(id, offer.clone());
        Ok(offer)
    }
}

#[async_trait]
impl ResourceAdapter for OfferAdapter {
    fn prototype(&self) -> Box<dyn AtomResource> {
        Box::new(Offer::default())
    }

    async fn find(
        &self,
        _ctx: &RequestContext,
        query: &QueryParameters,
    ) -> Result<Vec<Box<dyn AtomResource>>> {
        let store = self.store.lock().unwrap();
        if let Some(id) = &query.id {
            return Ok(store
                .get(id)
                .cloned()
                .map(|offer| Box::new(offer) as Box<dyn AtomResource>)
                .into_iter()
                .collect());
        }
        let mut offers: Vec<Box<dyn AtomResource>> = store
            .values()
            .cloned()
            .map(|offer| Box::new(offer) as Box<dyn AtomResource>)
            .collect();
        if query.max_results >= 0 {
            offers.truncate(query.max_results as usize);
        }
        Ok(offers)
    }

    async fn insert(
        &self,
        _ctx: &RequestContext,
        object: Box<dyn AtomResource>,
        slug: Option<&str>,
    ) -> Result<Box<dyn AtomResource>> {
        Ok(Box::new(self.store_new(object.as_ref(), slug)?))
    }

    async fn insert_batch(
        &self,
        _ctx: &RequestContext,
        objects: Vec<Box<dyn AtomResource>>,
    ) -> Result<Vec<Box<dyn AtomResource>>> {
        let mut stored: Vec<Box<dyn AtomResource>> = Vec::with_capacity(objects.len());
        for object in objects {
            stored.push(Box::new(self.store_new(object.as_ref(), None)?));
        }
        Ok(stored)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        object: Box<dyn AtomResource>,
        etag: &str,
    ) -> Result<Box<dyn AtomResource>> {
        let incoming = Self::concrete(object.as_ref())?;
        let id = incoming
            .id
            .clone()
            .ok_or_else(|| AtomPubError::BadRequest("update without an id".to_string()))?;
        let mut store = self.store.lock().unwrap();
        let current = store
            .get(&id)
            .ok_or_else(|| AtomPubError::NotFound(format!("no offer {id}")))?;
        if etag_from_version(current.version) != etag {
            return Err(AtomPubError::PreconditionFailed(format!(
                "offer {id} is at version {}",
                current.version
            )));
        }
        let updated = Offer {
            id: Some(id.clone()),
            version: current.version + 1,
            name: incoming.name,
        };
        store.insert(id, updated.clone());
        Ok(Box::new(updated))
    }

    async fn delete(&self, _ctx: &RequestContext, id: &str, etag: &str) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let current = store
            .get(id)
            .ok_or_else(|| AtomPubError::NotFound(format!("no offer {id}")))?;
        if etag_from_version(current.version) != etag {
            return Err(AtomPubError::PreconditionFailed(format!(
                "offer {id} is at version {}",
                current.version
            )));
        }
        store.remove(id);
        Ok(())
    }
}

fn fixture() -> (Dispatcher, Arc<OfferAdapter>, Arc<AdapterRegistry>) {
    let adapter = Arc::new(OfferAdapter::default());
    let registry = Arc::new(AdapterRegistry::new());
    registry.register("offer", adapter.clone());
    let dispatcher = Dispatcher::new(registry.clone(), ServerConfig::default().with_logging(false));
    (dispatcher, adapter, registry)
}

fn request(method: Method, url: &str) -> ApiRequest {
    ApiRequest::new(method, ResourceLocator::parse(url).unwrap())
}

fn entry_body(offer: &Offer) -> bytes::Bytes {
    entry_to_bytes(&offer.to_entry(true, None).unwrap(), false).unwrap()
}

#[tokio::test]
async fn test_get_collection_returns_feed() {
    let (dispatcher, adapter, _) = fixture();
    adapter.seed(Offer::stored("1", 1, "gnome"));
    adapter.seed(Offer::stored("2", 1, "rake"));

    let response = dispatcher
        .dispatch(request(Method::Get, &format!("{GATEWAY}/-/offer")))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.header("Content-Type"),
        Some("application/atom+xml; charset=UTF-8")
    );
    let feed = parse_feed(&response.body).unwrap();
    assert_eq!(feed.entries.len(), 2);
    assert_eq!(feed.entries[0].id.as_deref(), Some("urn:offer:1"));
    assert_eq!(feed.entries[1].id.as_deref(), Some("urn:offer:2"));
}

#[tokio::test]
async fn test_get_by_id_returns_entry() {
    let (dispatcher, adapter, _) = fixture();
    adapter.seed(Offer::stored("7", 3, "gnome"));

    let response = dispatcher
        .dispatch(request(Method::Get, &format!("{GATEWAY}/-/offer/entry7")))
        .await;

    assert_eq!(response.status, 200);
    let entry = parse_entry(&response.body).unwrap();
    assert_eq!(entry.id.as_deref(), Some("urn:offer:7"));
    assert_eq!(entry.etag.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_get_by_id_miss_is_not_found() {
    let (dispatcher, _, _) = fixture();

    let response = dispatcher
        .dispatch(request(Method::Get, &format!("{GATEWAY}/-/offer/entry9")))
        .await;

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_post_creates_with_location_and_fresh_etag() {
    let (dispatcher, adapter, _) = fixture();

    let response = dispatcher
        .dispatch(
            request(Method::Post, &format!("{GATEWAY}/-/offer"))
                .with_body(entry_body(&Offer::named("gnome"))),
        )
        .await;

    assert_eq!(response.status, 201);
    let entry = parse_entry(&response.body).unwrap();
    assert_eq!(entry.etag.as_deref(), Some("1"));
    let location = response.header("Location").unwrap();
    assert_eq!(location, entry.uri.as_deref().unwrap());
    assert!(adapter.snapshot("0").is_some());
}

#[tokio::test]
async fn test_put_with_override_is_treated_as_post() {
    let (dispatcher, adapter, _) = fixture();

    let response = dispatcher
        .dispatch(
            request(Method::Put, &format!("{GATEWAY}/-/offer"))
                .with_header("X-HTTP-Method-Override", "POST")
                .with_body(entry_body(&Offer::named("rake"))),
        )
        .await;

    assert_eq!(response.status, 201);
    assert_eq!(adapter.snapshot("0").unwrap().name, "rake");
}

#[tokio::test]
async fn test_slug_hint_is_percent_decoded() {
    let (dispatcher, adapter, _) = fixture();

    let response = dispatcher
        .dispatch(
            request(Method::Post, &format!("{GATEWAY}/-/offer"))
                .with_header("Slug", "garden%20gnome")
                .with_body(entry_body(&Offer::named("gnome"))),
        )
        .await;

    assert_eq!(response.status, 201);
    assert!(adapter.snapshot("garden-gnome").is_some());
}

#[tokio::test]
async fn test_stale_if_match_update_leaves_store_unchanged() {
    let (dispatcher, adapter, _) = fixture();
    adapter.seed(Offer::stored("7", 3, "gnome"));

    let response = dispatcher
        .dispatch(
            request(Method::Put, &format!("{GATEWAY}/-/offer"))
                .with_header("If-Match", "\"2\"")
                .with_body(entry_body(&Offer::stored("7", 2, "repainted gnome"))),
        )
        .await;

    assert_eq!(response.status, 412);
    let current = adapter.snapshot("7").unwrap();
    assert_eq!(current.version, 3);
    assert_eq!(current.name, "gnome");
}

#[tokio::test]
async fn test_update_with_current_etag_bumps_version() {
    let (dispatcher, adapter, _) = fixture();
    adapter.seed(Offer::stored("7", 3, "gnome"));

    let response = dispatcher
        .dispatch(
            request(Method::Put, &format!("{GATEWAY}/-/offer"))
                .with_header("If-Match", "\"3\"")
                .with_body(entry_body(&Offer::stored("7", 3, "repainted gnome"))),
        )
        .await;

    assert_eq!(response.status, 200);
    let entry = parse_entry(&response.body).unwrap();
    assert_eq!(entry.etag.as_deref(), Some("4"));
    assert_eq!(adapter.snapshot("7").unwrap().name, "repainted gnome");
}

#[tokio::test]
async fn test_delete_without_if_match_is_precondition_failed() {
    let (dispatcher, adapter, _) = fixture();
    adapter.seed(Offer::stored("7", 3, "gnome"));

    let response = dispatcher
        .dispatch(request(Method::Delete, &format!("{GATEWAY}/-/offer/entry7")))
        .await;

    assert_eq!(response.status, 412);
    assert!(adapter.snapshot("7").is_some());
}

#[tokio::test]
async fn test_delete_with_current_etag_removes() {
    let (dispatcher, adapter, _) = fixture();
    adapter.seed(Offer::stored("7", 3, "gnome"));

    let response = dispatcher
        .dispatch(
            request(Method::Delete, &format!("{GATEWAY}/-/offer/entry7"))
                .with_header("If-Match", "\"3\""),
        )
        .await;

    assert_eq!(response.status, 200);
    assert!(adapter.snapshot("7").is_none());
}

#[tokio::test]
async fn test_batch_post_stores_all_and_returns_empty_feed() {
    let (dispatcher, adapter, _) = fixture();

    let mut feed = Feed::new();
    feed.add_entry(Offer::named("gnome").to_entry(false, None).unwrap());
    feed.add_entry(Offer::named("rake").to_entry(false, None).unwrap());
    let body = feed_to_bytes(feed, false).unwrap();

    let response = dispatcher
        .dispatch(request(Method::Post, &format!("{GATEWAY}/-/offer")).with_body(body))
        .await;

    assert_eq!(response.status, 200);
    let reply = parse_feed(&response.body).unwrap();
    assert!(reply.entries.is_empty());
    assert_eq!(adapter.snapshot("0").unwrap().name, "gnome");
    assert_eq!(adapter.snapshot("1").unwrap().name, "rake");
}

#[tokio::test]
async fn test_local_proxy_supports_batch_insert() {
    let (_, adapter, registry) = fixture();
    let proxy = LocalProxy::new(registry, "offer");

    let stored = proxy
        .insert_batch(vec![
            Box::new(Offer::named("gnome")),
            Box::new(Offer::named("rake")),
        ])
        .await
        .unwrap();

    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|offer| offer.etag().is_some()));
    assert!(adapter.snapshot("0").is_some());
    assert!(adapter.snapshot("1").is_some());
}

#[tokio::test]
async fn test_local_proxy_round_trip() {
    let (_, _, registry) = fixture();
    let proxy = LocalProxy::new(registry, "offer");

    let stored = proxy
        .insert(Box::new(Offer::named("gnome")), Some("gnome"))
        .await
        .unwrap();
    assert_eq!(stored.id().as_deref(), Some("gnome"));

    let mut query = QueryParameters::new();
    query.id = Some("gnome".to_string());
    let found = proxy.get(&query).await.unwrap();
    assert_eq!(found.len(), 1);

    proxy
        .delete("gnome", &stored.etag().unwrap())
        .await
        .unwrap();
    let missing = proxy.get(&query).await;
    assert!(matches!(missing, Err(AtomPubError::NotFound(_))));
}
