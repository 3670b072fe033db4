//! Index-based in-place URL builder and rewriter.
//!
//! A [`ResourceLocator`] is one canonical string. Every accessor recomputes
//! scheme/host/port/path boundaries from the live string on each call; no
//! derived index survives a mutation. That trade-off is deliberate: there is
//! never a stale-index bug class, at the cost of re-scanning per access.
//!
//! An explicit port equal to the scheme's default (80 for http, 443 for
//! https) is never retained in the canonical string; default-port elision is
//! re-evaluated on every mutating operation, including scheme changes.
//!
//! # Examples
//!
//! ```
//! use atompub_http_rs::core::locator::ResourceLocator;
//!
//! let loc = ResourceLocator::parse("http://shop.example.com:80/data/-/offer").unwrap();
//! assert_eq!(loc.as_str(), "http://shop.example.com/data/-/offer");
//! assert_eq!(loc.port(), None);
//! assert_eq!(loc.file(), "offer");
//! ```

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::core::error::{AtomPubError, Result};

/// Everything except RFC 3986 unreserved characters gets percent-encoded in
/// query keys and values.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode one query key or value.
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_SET).to_string()
}

/// Percent-decode one query key or value. `+` decodes to a space
/// (form-style leniency); encoding always emits `%20`.
pub fn decode_component(wire: &str) -> Result<String> {
    let plus_decoded = wire.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| AtomPubError::BadRequest(format!("bad percent encoding: {}", wire)))
}

/// A mutable URL held as a single canonical string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLocator {
    url: String,
}

impl ResourceLocator {
    /// Construct from a complete absolute string beginning with a scheme.
    ///
    /// Bad scheme or unparsable port are programming-bug indicators and
    /// surface as `Internal`.
    pub fn parse(spec: &str) -> Result<Self> {
        let idx = spec.find("://").ok_or_else(|| {
            AtomPubError::Internal(format!("locator without scheme: {}", spec))
        })?;
        let scheme = &spec[..idx];
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(AtomPubError::Internal(format!("bad scheme in: {}", spec)));
        }
        let mut locator = ResourceLocator {
            url: spec.to_string(),
        };
        // Validates the port digits as a side effect.
        let _ = locator.checked_port()?;
        locator.normalize_port()?;
        Ok(locator)
    }

    /// Construct by resolving `spec` against a base locator.
    ///
    /// Absolute specs stand alone; a leading `/` replaces everything from
    /// the first `/` after host:port; anything else is taken relative to
    /// the base's current file and `segment/..` pairs are collapsed.
    pub fn resolve(spec: &str, base: &ResourceLocator) -> Result<Self> {
        if spec.find("://").is_some_and(|idx| idx > 0) {
            return ResourceLocator::parse(spec);
        }
        let origin = base.origin();
        if let Some(absolute_path) = spec.strip_prefix('/') {
            return ResourceLocator::parse(&format!("{}/{}", origin, absolute_path));
        }
        let combined = format!("{}{}{}", origin, base.path(), spec);
        let (prefix, rest) = split_origin(&combined);
        let (path_part, suffix) = match rest.find('?') {
            Some(q) => (&rest[..q], &rest[q..]),
            None => (rest, ""),
        };
        let collapsed = collapse_dot_segments(path_part);
        ResourceLocator::parse(&format!("{}{}{}", prefix, collapsed, suffix))
    }

    /// The canonical string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// `scheme://host[:port]`, with the port already normalized.
    pub fn origin(&self) -> String {
        let (start, end) = self.authority_bounds();
        format!("{}://{}", self.scheme(), &self.url[start..end])
    }

    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end()]
    }

    pub fn host(&self) -> &str {
        let (start, end) = self.authority_bounds();
        let authority = &self.url[start..end];
        match authority.find(':') {
            Some(colon) => &authority[..colon],
            None => authority,
        }
    }

    /// The explicit port, if one is present in the canonical string.
    pub fn port(&self) -> Option<u16> {
        self.checked_port().ok().flatten()
    }

    /// The directory portion between host:port and the file, always
    /// `/`-wrapped. `http://h/a/b/c?q` has path `/a/b/`.
    pub fn path(&self) -> &str {
        let (path, _) = self.split_path_file();
        path
    }

    /// The last path segment before the query. May be empty.
    pub fn file(&self) -> &str {
        let (_, file) = self.split_path_file();
        file
    }

    /// The raw query string after `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.query_start().map(|q| &self.url[q + 1..])
    }

    /// Decoded query parameters.
    pub fn query_params(&self) -> Result<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        let Some(query) = self.query() else {
            return Ok(params);
        };
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, value),
                None => (pair, ""),
            };
            params.insert(decode_component(key)?, decode_component(value)?);
        }
        Ok(params)
    }

    pub fn set_scheme(&mut self, scheme: &str) -> Result<()> {
        if scheme.is_empty() {
            return Err(AtomPubError::Internal("empty scheme".to_string()));
        }
        let end = self.scheme_end();
        self.url.replace_range(..end, scheme);
        self.normalize_port()
    }

    pub fn set_host(&mut self, host: &str) -> Result<()> {
        let (start, end) = self.authority_bounds();
        let port_suffix = self.url[start..end]
            .find(':')
            .map(|colon| self.url[start + colon..end].to_string())
            .unwrap_or_default();
        self.url
            .replace_range(start..end, &format!("{}{}", host, port_suffix));
        self.normalize_port()
    }

    /// Set or clear the explicit port. A port equal to the scheme default
    /// is elided immediately.
    pub fn set_port(&mut self, port: Option<u16>) -> Result<()> {
        let (start, end) = self.authority_bounds();
        let host = self.host().to_string();
        let authority = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };
        self.url.replace_range(start..end, &authority);
        self.normalize_port()
    }

    /// Replace the directory portion, keeping the file.
    pub fn set_path(&mut self, path: &str) -> Result<()> {
        let (bounds, _) = self.path_file_bounds();
        let mut normalized = String::new();
        if !path.starts_with('/') {
            normalized.push('/');
        }
        normalized.push_str(path);
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        self.url.replace_range(bounds.0..bounds.1, &normalized);
        self.normalize_port()
    }

    /// Replace the file portion, keeping path and query.
    pub fn set_file(&mut self, file: &str) -> Result<()> {
        let (path_bounds, bounds) = self.path_file_bounds();
        if path_bounds.0 == path_bounds.1 {
            // No path at all yet; the file needs its leading slash.
            self.url
                .replace_range(bounds.0..bounds.1, &format!("/{}", file));
        } else {
            self.url.replace_range(bounds.0..bounds.1, file);
        }
        self.normalize_port()
    }

    /// Whole-map query replacement, re-encoding every key and value.
    pub fn set_query_params(&mut self, params: &BTreeMap<String, String>) -> Result<()> {
        let cut = self.query_start().unwrap_or(self.url.len());
        self.url.truncate(cut);
        if !params.is_empty() {
            let rendered: Vec<String> = params
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", encode_component(key), encode_component(value))
                })
                .collect();
            self.url.push('?');
            self.url.push_str(&rendered.join("&"));
        }
        self.normalize_port()
    }

    /// Raw concatenation with no syntax validation. Callers are responsible
    /// for correct placement (used to build `/entry<id>` suffixes).
    pub fn append(&mut self, token: &str) {
        self.url.push_str(token);
    }

    /// Insert a path suffix immediately before the query string, if any.
    pub fn append_to_path(&mut self, token: &str) {
        match self.query_start() {
            Some(q) => self.url.insert_str(q, token),
            None => self.url.push_str(token),
        }
    }

    // Boundary scans. All recomputed from the live string on each call.

    fn scheme_end(&self) -> usize {
        self.url.find("://").unwrap_or(0)
    }

    fn authority_bounds(&self) -> (usize, usize) {
        let start = self.scheme_end() + 3;
        let end = self.url[start..]
            .find(['/', '?'])
            .map(|offset| start + offset)
            .unwrap_or(self.url.len());
        (start, end)
    }

    fn query_start(&self) -> Option<usize> {
        self.url.find('?')
    }

    fn path_file_bounds(&self) -> ((usize, usize), (usize, usize)) {
        let (_, authority_end) = self.authority_bounds();
        let end = self.query_start().unwrap_or(self.url.len());
        let full = &self.url[authority_end..end];
        match full.rfind('/') {
            Some(slash) => (
                (authority_end, authority_end + slash + 1),
                (authority_end + slash + 1, end),
            ),
            None => ((authority_end, authority_end), (authority_end, end)),
        }
    }

    fn split_path_file(&self) -> (&str, &str) {
        let (path_bounds, file_bounds) = self.path_file_bounds();
        let path = &self.url[path_bounds.0..path_bounds.1];
        let file = &self.url[file_bounds.0..file_bounds.1];
        if path.is_empty() {
            ("/", file)
        } else {
            (path, file)
        }
    }

    fn checked_port(&self) -> Result<Option<u16>> {
        let (start, end) = self.authority_bounds();
        let authority = &self.url[start..end];
        match authority.find(':') {
            Some(colon) => authority[colon + 1..]
                .parse::<u16>()
                .map(Some)
                .map_err(|_| {
                    AtomPubError::Internal(format!("bad port in locator: {}", self.url))
                }),
            None => Ok(None),
        }
    }

    fn default_port(scheme: &str) -> Option<u16> {
        match scheme {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        }
    }

    /// Drop an explicit port equal to the scheme's default. Called after
    /// every mutation.
    fn normalize_port(&mut self) -> Result<()> {
        let explicit = self.checked_port()?;
        let default = Self::default_port(self.scheme());
        if let (Some(port), Some(default)) = (explicit, default) {
            if port == default {
                let (start, end) = self.authority_bounds();
                let host = self.host().to_string();
                self.url.replace_range(start..end, &host);
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

fn split_origin(url: &str) -> (&str, &str) {
    let start = url.find("://").map(|idx| idx + 3).unwrap_or(0);
    let end = url[start..]
        .find(['/', '?'])
        .map(|offset| start + offset)
        .unwrap_or(url.len());
    (&url[..end], &url[end..])
}

/// Collapse `segment/..` pairs (and lone `.` segments) in a path.
fn collapse_dot_segments(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elides_default_port() {
        let loc = ResourceLocator::parse("http://h:80/x").unwrap();
        assert_eq!(loc.as_str(), "http://h/x");
        assert_eq!(loc.port(), None);

        let loc = ResourceLocator::parse("https://h:443/x").unwrap();
        assert_eq!(loc.as_str(), "https://h/x");
    }

    #[test]
    fn test_parse_keeps_nondefault_port() {
        let loc = ResourceLocator::parse("http://h:8080/x").unwrap();
        assert_eq!(loc.port(), Some(8080));
        assert_eq!(loc.host(), "h");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ResourceLocator::parse("not a url").is_err());
        assert!(ResourceLocator::parse("://h/x").is_err());
        assert!(ResourceLocator::parse("http://h:99999/x").is_err());
    }

    #[test]
    fn test_scheme_change_reevaluates_port() {
        let mut loc = ResourceLocator::parse("http://h:443/x").unwrap();
        assert_eq!(loc.port(), Some(443));
        loc.set_scheme("https").unwrap();
        assert_eq!(loc.as_str(), "https://h/x");
        assert_eq!(loc.port(), None);
        loc.set_scheme("http").unwrap();
        assert_eq!(loc.port(), None);
    }

    #[test]
    fn test_path_and_file() {
        let loc = ResourceLocator::parse("http://h/a/b/c.html?q=1").unwrap();
        assert_eq!(loc.path(), "/a/b/");
        assert_eq!(loc.file(), "c.html");
        assert_eq!(loc.query(), Some("q=1"));

        let loc = ResourceLocator::parse("http://h").unwrap();
        assert_eq!(loc.path(), "/");
        assert_eq!(loc.file(), "");
        assert_eq!(loc.query(), None);
    }

    #[test]
    fn test_set_path_and_file() {
        let mut loc = ResourceLocator::parse("http://h/a/b/c.html").unwrap();
        loc.set_file("d.html").unwrap();
        assert_eq!(loc.as_str(), "http://h/a/b/d.html");
        loc.set_path("x/y").unwrap();
        assert_eq!(loc.as_str(), "http://h/x/y/d.html");
    }

    #[test]
    fn test_set_host_and_port() {
        let mut loc = ResourceLocator::parse("http://h:8080/x").unwrap();
        loc.set_host("other").unwrap();
        assert_eq!(loc.as_str(), "http://other:8080/x");
        loc.set_port(Some(80)).unwrap();
        assert_eq!(loc.as_str(), "http://other/x");
        loc.set_port(Some(81)).unwrap();
        assert_eq!(loc.as_str(), "http://other:81/x");
        loc.set_port(None).unwrap();
        assert_eq!(loc.as_str(), "http://other/x");
    }

    #[test]
    fn test_query_params_round_trip() {
        let mut loc = ResourceLocator::parse("http://h/x").unwrap();
        let mut params = BTreeMap::new();
        params.insert("q".to_string(), "foo bar".to_string());
        params.insert("style".to_string(), "short".to_string());
        loc.set_query_params(&params).unwrap();
        assert_eq!(loc.query(), Some("q=foo%20bar&style=short"));
        assert_eq!(loc.query_params().unwrap(), params);
    }

    #[test]
    fn test_query_replacement_is_whole_map() {
        let mut loc = ResourceLocator::parse("http://h/x?a=1&b=2").unwrap();
        let mut params = BTreeMap::new();
        params.insert("c".to_string(), "3".to_string());
        loc.set_query_params(&params).unwrap();
        assert_eq!(loc.query(), Some("c=3"));
        loc.set_query_params(&BTreeMap::new()).unwrap();
        assert_eq!(loc.query(), None);
    }

    #[test]
    fn test_decode_plus_as_space() {
        let loc = ResourceLocator::parse("http://h/x?q=foo+bar").unwrap();
        assert_eq!(loc.query_params().unwrap()["q"], "foo bar");
    }

    #[test]
    fn test_resolve_absolute() {
        let base = ResourceLocator::parse("http://h/a/b.html").unwrap();
        let loc = ResourceLocator::resolve("https://other/x", &base).unwrap();
        assert_eq!(loc.as_str(), "https://other/x");
    }

    #[test]
    fn test_resolve_absolute_path() {
        let base = ResourceLocator::parse("http://h:8080/a/b.html?x=1").unwrap();
        let loc = ResourceLocator::resolve("/c/d", &base).unwrap();
        assert_eq!(loc.as_str(), "http://h:8080/c/d");
    }

    #[test]
    fn test_resolve_relative() {
        let base = ResourceLocator::parse("http://h/a/b/c.html").unwrap();
        let loc = ResourceLocator::resolve("d.html", &base).unwrap();
        assert_eq!(loc.as_str(), "http://h/a/b/d.html");
    }

    #[test]
    fn test_resolve_relative_collapses_parent_segments() {
        let base = ResourceLocator::parse("http://h/a/b/c.html").unwrap();
        let loc = ResourceLocator::resolve("../d.html", &base).unwrap();
        assert_eq!(loc.as_str(), "http://h/a/d.html");
    }

    #[test]
    fn test_append_is_raw() {
        let mut loc = ResourceLocator::parse("http://h/data/-/offer").unwrap();
        loc.append("/entry42");
        assert_eq!(loc.as_str(), "http://h/data/-/offer/entry42");
    }

    #[test]
    fn test_append_to_path_before_query() {
        let mut loc = ResourceLocator::parse("http://h/data/-/offer?style=short").unwrap();
        loc.append_to_path("/entry42");
        assert_eq!(loc.as_str(), "http://h/data/-/offer/entry42?style=short");
    }

    #[test]
    fn test_origin() {
        let loc = ResourceLocator::parse("http://h:8080/a/b?q=1").unwrap();
        assert_eq!(loc.origin(), "http://h:8080");
    }
}
