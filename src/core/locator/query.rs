//! The query grammar layered on top of the resource locator.
//!
//! A request path embeds the category segments after a `/-/` marker and an
//! optional `/entry<id>` segment; everything else travels as ordinary query
//! parameters. The entry id is *not* a query key.
//!
//! ```text
//! http://h/data/-/offer/entry123?style=short&max-results=10
//!                 ▲▲▲▲▲  ▲▲▲▲▲▲▲ ▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲▲
//!               category  entry id      parameter bag
//! ```
//!
//! Round-trip law: rendering a [`QueryParameters`] into a locator and
//! re-extracting yields an equal bag, except that unset optional fields
//! parse back to their documented defaults.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::core::error::{AtomPubError, Result};
use crate::core::locator::url::{decode_component, encode_component, ResourceLocator};
use crate::core::types::Category;

/// Marker separating the fixed path from category segments.
pub const CATEGORY_MARKER: &str = "/-/";

/// Path-segment prefix carrying the entry id.
pub const ENTRY_SEGMENT_PREFIX: &str = "entry";

/// Default `max-results` when the parameter is absent.
pub const DEFAULT_MAX_RESULTS: i32 = 35;

/// Default `start-index` when the parameter is absent.
pub const DEFAULT_START_INDEX: i32 = 1;

/// Typed bag over the locator's query string plus the out-of-band entry id.
///
/// The entry id and the other parameters may coexist (relaxed from the
/// strict form of the grammar, which forbade combining them).
#[derive(Clone, Debug, PartialEq)]
pub struct QueryParameters {
    /// Entry id from the `/entry<id>` path segment.
    pub id: Option<String>,
    /// Presentation style handed to the adapter's entry conversion.
    pub style: Option<String>,
    pub alt: Option<String>,
    pub author: Option<String>,
    /// Full-text search expression.
    pub q: Option<String>,
    /// -1 means unbounded, 0 means an empty result page.
    pub max_results: i32,
    pub start_index: i32,
    pub published_min: Option<DateTime<FixedOffset>>,
    pub published_max: Option<DateTime<FixedOffset>>,
    pub updated_min: Option<DateTime<FixedOffset>>,
    pub updated_max: Option<DateTime<FixedOffset>>,
    pub prettyprint: bool,
}

impl Default for QueryParameters {
    fn default() -> Self {
        QueryParameters {
            id: None,
            style: None,
            alt: None,
            author: None,
            q: None,
            max_results: DEFAULT_MAX_RESULTS,
            start_index: DEFAULT_START_INDEX,
            published_min: None,
            published_max: None,
            updated_min: None,
            updated_max: None,
            prettyprint: false,
        }
    }
}

impl QueryParameters {
    pub fn new() -> Self {
        QueryParameters::default()
    }

    /// Render this bag into the locator: the entry segment onto the path,
    /// everything else as query parameters. Fields at their defaults are
    /// omitted.
    pub fn apply_to(&self, locator: &mut ResourceLocator) -> Result<()> {
        if let Some(id) = &self.id {
            locator.append_to_path(&format!("/{}{}", ENTRY_SEGMENT_PREFIX, encode_component(id)));
        }

        let mut params = BTreeMap::new();
        if let Some(style) = &self.style {
            params.insert("style".to_string(), style.clone());
        }
        if let Some(alt) = &self.alt {
            params.insert("alt".to_string(), alt.clone());
        }
        if let Some(author) = &self.author {
            params.insert("author".to_string(), author.clone());
        }
        if let Some(q) = &self.q {
            params.insert("q".to_string(), q.clone());
        }
        if self.max_results != DEFAULT_MAX_RESULTS {
            params.insert("max-results".to_string(), self.max_results.to_string());
        }
        if self.start_index != DEFAULT_START_INDEX {
            params.insert("start-index".to_string(), self.start_index.to_string());
        }
        for (key, value) in [
            ("published-min", &self.published_min),
            ("published-max", &self.published_max),
            ("updated-min", &self.updated_min),
            ("updated-max", &self.updated_max),
        ] {
            if let Some(value) = value {
                params.insert(
                    key.to_string(),
                    value.to_rfc3339_opts(SecondsFormat::Secs, false),
                );
            }
        }
        if self.prettyprint {
            params.insert("prettyprint".to_string(), "true".to_string());
        }
        locator.set_query_params(&params)
    }
}

/// Extract the ordered categories from the locator's path.
///
/// Scans for the `/-/` marker and collects every following segment up to
/// the `/entry<id>` segment, the query string, or the end of the path. The
/// entry segment itself is excluded. Path segments carry only the term;
/// scheme and label stay unset.
pub fn categories(locator: &ResourceLocator) -> Result<Vec<Category>> {
    let mut terms = Vec::new();
    for segment in segments_after_marker(locator) {
        if segment.starts_with(ENTRY_SEGMENT_PREFIX) {
            break;
        }
        terms.push(Category::new(decode_component(segment)?));
    }
    Ok(terms)
}

/// Extract the full parameter bag: decoded query keys plus the path-embedded
/// entry id.
pub fn parameters(locator: &ResourceLocator) -> Result<QueryParameters> {
    let mut query = QueryParameters::new();

    for segment in segments_after_marker(locator) {
        if let Some(id) = segment.strip_prefix(ENTRY_SEGMENT_PREFIX) {
            if !id.is_empty() {
                query.id = Some(decode_component(id)?);
            }
            break;
        }
    }

    for (key, value) in locator.query_params()? {
        match key.as_str() {
            "style" => query.style = Some(value),
            "alt" => query.alt = Some(value),
            "author" => query.author = Some(value),
            "q" => query.q = Some(value),
            "max-results" => query.max_results = parse_int(&key, &value)?,
            "start-index" => query.start_index = parse_int(&key, &value)?,
            "published-min" => query.published_min = Some(parse_date(&key, &value)?),
            "published-max" => query.published_max = Some(parse_date(&key, &value)?),
            "updated-min" => query.updated_min = Some(parse_date(&key, &value)?),
            "updated-max" => query.updated_max = Some(parse_date(&key, &value)?),
            "prettyprint" => query.prettyprint = value == "true",
            // Unknown keys pass through unmodeled.
            _ => {}
        }
    }
    Ok(query)
}

fn segments_after_marker(locator: &ResourceLocator) -> impl Iterator<Item = &str> {
    let full_path = &locator.as_str()
        [..locator.as_str().find('?').unwrap_or(locator.as_str().len())];
    let after = full_path
        .find(CATEGORY_MARKER)
        .map(|idx| &full_path[idx + CATEGORY_MARKER.len()..])
        .unwrap_or("");
    after.split('/').filter(|segment| !segment.is_empty())
}

fn parse_int(key: &str, value: &str) -> Result<i32> {
    value
        .parse()
        .map_err(|_| AtomPubError::BadRequest(format!("bad {} value: {}", key, value)))
}

fn parse_date(key: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|_| AtomPubError::BadRequest(format!("bad {} value: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(spec: &str) -> ResourceLocator {
        ResourceLocator::parse(spec).unwrap()
    }

    fn terms(loc: &ResourceLocator) -> Vec<String> {
        categories(loc)
            .unwrap()
            .into_iter()
            .map(|category| category.term)
            .collect()
    }

    #[test]
    fn test_categories_single() {
        let loc = locator("http://h/data/-/offer/entry123?style=short");
        assert_eq!(categories(&loc).unwrap(), vec![Category::new("offer")]);
    }

    #[test]
    fn test_categories_multiple() {
        let loc = locator("http://h/data/-/offer/used/cheap");
        assert_eq!(terms(&loc), vec!["offer", "used", "cheap"]);
    }

    #[test]
    fn test_categories_absent_marker() {
        let loc = locator("http://h/data/offer");
        assert!(categories(&loc).unwrap().is_empty());
    }

    #[test]
    fn test_entry_id_extraction() {
        let loc = locator("http://h/data/-/offer/entry123?style=short");
        let query = parameters(&loc).unwrap();
        assert_eq!(query.id.as_deref(), Some("123"));
        assert_eq!(query.style.as_deref(), Some("short"));
    }

    #[test]
    fn test_id_and_parameters_may_coexist() {
        let loc = locator("http://h/data/-/offer/entry9?max-results=2&q=x");
        let query = parameters(&loc).unwrap();
        assert_eq!(query.id.as_deref(), Some("9"));
        assert_eq!(query.max_results, 2);
        assert_eq!(query.q.as_deref(), Some("x"));
    }

    #[test]
    fn test_defaults() {
        let loc = locator("http://h/data/-/offer");
        let query = parameters(&loc).unwrap();
        assert_eq!(query.max_results, 35);
        assert_eq!(query.start_index, 1);
        assert!(!query.prettyprint);
        assert!(query.id.is_none());
        assert!(query.q.is_none());
    }

    #[test]
    fn test_round_trip() {
        let bag = QueryParameters {
            style: Some("short".to_string()),
            q: Some("foo bar".to_string()),
            max_results: 30,
            start_index: 17,
            ..QueryParameters::default()
        };
        let mut loc = locator("http://h/data/-/offer");
        bag.apply_to(&mut loc).unwrap();
        let reparsed = parameters(&loc).unwrap();
        assert_eq!(reparsed, bag);
    }

    #[test]
    fn test_round_trip_with_dates_and_id() {
        let min = DateTime::parse_from_rfc3339("2009-04-01T00:00:00+00:00").unwrap();
        let bag = QueryParameters {
            id: Some("42".to_string()),
            updated_min: Some(min),
            prettyprint: true,
            ..QueryParameters::default()
        };
        let mut loc = locator("http://h/data/-/offer");
        bag.apply_to(&mut loc).unwrap();
        assert!(loc.as_str().contains("/entry42"));
        let reparsed = parameters(&loc).unwrap();
        assert_eq!(reparsed, bag);
    }

    #[test]
    fn test_unset_defaults_not_rendered() {
        let bag = QueryParameters::default();
        let mut loc = locator("http://h/data/-/offer");
        bag.apply_to(&mut loc).unwrap();
        assert_eq!(loc.query(), None);
    }

    #[test]
    fn test_bad_int_is_bad_request() {
        let loc = locator("http://h/data/-/offer?max-results=lots");
        assert!(matches!(
            parameters(&loc),
            Err(AtomPubError::BadRequest(_))
        ));
    }

    #[test]
    fn test_search_text_decoded() {
        let loc = locator("http://h/data/-/offer?q=foo%20bar");
        assert_eq!(parameters(&loc).unwrap().q.as_deref(), Some("foo bar"));
    }
}
