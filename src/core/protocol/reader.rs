//! Buffered Atom parsing: bytes to a [`Feed`] or [`Entry`] tree.
//!
//! Parsing is independent of emission; a parsed document re-serializes
//! structurally, not byte-identically. Malformed input is fatal for the
//! document — there is no partial-document recovery. Constructs the model
//! deliberately does not implement (category inside an entry, contributors,
//! XHTML text, media-link source) raise
//! [`AtomPubError::NotImplemented`] rather than silently dropping data.

use chrono::DateTime;

use crate::core::error::{AtomPubError, Result};
use crate::core::protocol::escape::unescape_text;
use crate::core::protocol::etag::parse_strong;
use crate::core::types::{
    Entry, ExtensionElement, Feed, Generator, Link, Namespace, Person, Text, ATOM_NS, GDATA_NS,
    XSI_NS,
};

/// A parsed request or response body, branched on its root element.
#[derive(Debug)]
pub enum ParsedDocument {
    Entry(Entry),
    Feed(Feed),
}

/// Parse a body whose root may be either an entry or a feed.
pub fn parse_body(input: &[u8]) -> Result<ParsedDocument> {
    let root = parse_document(as_utf8(input)?)?;
    match local_name(&root.name) {
        "entry" => Ok(ParsedDocument::Entry(entry_from_element(&root, true)?)),
        "feed" => Ok(ParsedDocument::Feed(feed_from_element(&root)?)),
        other => Err(AtomPubError::BadRequest(format!(
            "unexpected root element: {}",
            other
        ))),
    }
}

/// Parse a document whose root must be an entry.
pub fn parse_entry(input: &[u8]) -> Result<Entry> {
    match parse_body(input)? {
        ParsedDocument::Entry(entry) => Ok(entry),
        ParsedDocument::Feed(_) => Err(AtomPubError::BadRequest(
            "expected an entry document, found a feed".to_string(),
        )),
    }
}

/// Parse a document whose root must be a feed.
pub fn parse_feed(input: &[u8]) -> Result<Feed> {
    match parse_body(input)? {
        ParsedDocument::Feed(feed) => Ok(feed),
        ParsedDocument::Entry(_) => Err(AtomPubError::BadRequest(
            "expected a feed document, found an entry".to_string(),
        )),
    }
}

fn as_utf8(input: &[u8]) -> Result<&str> {
    std::str::from_utf8(input)
        .map_err(|_| AtomPubError::BadRequest("document is not valid UTF-8".to_string()))
}

/// Generic parsed element before Atom folding.
#[derive(Debug, Default)]
struct RawElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<RawElement>,
}

impl RawElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

fn malformed(detail: impl Into<String>) -> AtomPubError {
    AtomPubError::BadRequest(format!("malformed document: {}", detail.into()))
}

/// Scan the document into a tree of [`RawElement`]s.
///
/// Handles the XML declaration, comments, start/end/self-closing tags, and
/// text nodes. Text is unescaped here with the lenient four-entity rules.
fn parse_document(input: &str) -> Result<RawElement> {
    let mut stack: Vec<RawElement> = Vec::new();
    let mut root: Option<RawElement> = None;
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        let text = &rest[..open];
        if let Some(top) = stack.last_mut() {
            top.text.push_str(&unescape_text(text));
        } else if !text.trim().is_empty() {
            return Err(malformed("text outside the root element"));
        }
        rest = &rest[open..];

        if let Some(tail) = rest.strip_prefix("<?") {
            let end = tail.find("?>").ok_or_else(|| malformed("unterminated declaration"))?;
            rest = &tail[end + 2..];
        } else if let Some(tail) = rest.strip_prefix("<!--") {
            let end = tail.find("-->").ok_or_else(|| malformed("unterminated comment"))?;
            rest = &tail[end + 3..];
        } else if let Some(tail) = rest.strip_prefix("</") {
            let end = tail.find('>').ok_or_else(|| malformed("unterminated close tag"))?;
            let name = tail[..end].trim();
            let element = stack
                .pop()
                .ok_or_else(|| malformed(format!("unmatched close tag: {}", name)))?;
            if element.name != name {
                return Err(malformed(format!(
                    "mismatched close tag: expected {}, found {}",
                    element.name, name
                )));
            }
            attach(element, &mut stack, &mut root)?;
            rest = &tail[end + 1..];
        } else {
            let end = rest.find('>').ok_or_else(|| malformed("unterminated tag"))?;
            let self_closing = rest[..end].ends_with('/');
            let inner_end = if self_closing { end - 1 } else { end };
            let element = parse_tag(&rest[1..inner_end])?;
            if self_closing {
                attach(element, &mut stack, &mut root)?;
            } else {
                stack.push(element);
            }
            rest = &rest[end + 1..];
        }
    }

    if !stack.is_empty() {
        return Err(malformed(format!("unclosed element: {}", stack[0].name)));
    }
    if !rest.trim().is_empty() && root.is_none() {
        return Err(malformed("no markup found"));
    }
    root.ok_or_else(|| malformed("no root element"))
}

fn attach(
    element: RawElement,
    stack: &mut Vec<RawElement>,
    root: &mut Option<RawElement>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(malformed("multiple root elements"));
            }
            *root = Some(element);
            Ok(())
        }
    }
}

/// Parse `name attr="value" ...` from inside a start tag.
fn parse_tag(inner: &str) -> Result<RawElement> {
    let inner = inner.trim();
    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = &inner[..name_end];
    if name.is_empty() {
        return Err(malformed("empty tag name"));
    }

    let mut element = RawElement {
        name: name.to_string(),
        ..Default::default()
    };

    let mut rest = inner[name_end..].trim_start();
    while !rest.is_empty() {
        let eq = rest
            .find('=')
            .ok_or_else(|| malformed(format!("attribute without value in <{}>", name)))?;
        let attr = rest[..eq].trim().to_string();
        rest = rest[eq + 1..].trim_start();
        let quote = rest
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| malformed(format!("unquoted attribute value in <{}>", name)))?;
        let value_end = rest[1..]
            .find(quote)
            .ok_or_else(|| malformed(format!("unterminated attribute value in <{}>", name)))?;
        let value = unescape_text(&rest[1..1 + value_end]);
        element.attributes.push((attr, value));
        rest = rest[value_end + 2..].trim_start();
    }
    Ok(element)
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn entry_from_element(element: &RawElement, is_root: bool) -> Result<Entry> {
    let mut entry = Entry::empty();

    for (attr, value) in &element.attributes {
        if local_name(attr) == "etag" {
            entry.etag = Some(parse_strong(value)?);
        }
    }
    if is_root {
        fold_namespaces(element, &mut entry.namespaces);
    }

    for child in &element.children {
        fold_entry_child(&mut entry, child)?;
    }
    Ok(entry)
}

fn fold_entry_child(entry: &mut Entry, child: &RawElement) -> Result<()> {
    match local_name(&child.name) {
        "id" => entry.id = Some(child.trimmed_text().to_string()),
        "title" => entry.title = Some(text_construct(child)?),
        "summary" => entry.summary = Some(text_construct(child)?),
        "rights" => entry.rights = Some(text_construct(child)?),
        "content" => {
            if child.attribute("src").is_some() {
                return Err(AtomPubError::NotImplemented(
                    "media-link content source".to_string(),
                ));
            }
            entry.content = Some(text_construct(child)?);
        }
        "author" => entry.authors.push(person(child)),
        "contributor" => {
            return Err(AtomPubError::NotImplemented("contributor element".to_string()))
        }
        "category" => {
            return Err(AtomPubError::NotImplemented(
                "category element inside entry".to_string(),
            ))
        }
        "link" => {
            let link = link(child)?;
            if link.is_self() {
                entry.uri = Some(link.href);
            } else {
                entry.links.push(link);
            }
        }
        "published" => entry.published = Some(timestamp(child)?),
        "updated" => entry.updated = Some(timestamp(child)?),
        _ => entry.extensions.push(extension(child)),
    }
    Ok(())
}

fn feed_from_element(element: &RawElement) -> Result<Feed> {
    let mut feed = Feed::empty();
    fold_namespaces(element, &mut feed.namespaces);

    for child in &element.children {
        match local_name(&child.name) {
            "id" => feed.id = Some(child.trimmed_text().to_string()),
            "title" => feed.title = Some(text_construct(child)?),
            "updated" => feed.updated = Some(timestamp(child)?),
            "author" => feed.authors.push(person(child)),
            "link" => feed.links.push(link(child)?),
            "generator" => {
                feed.generator = Some(Generator {
                    name: child.trimmed_text().to_string(),
                    uri: child.attribute("uri").map(str::to_string),
                    version: child.attribute("version").map(str::to_string),
                })
            }
            "entry" => {
                let entry = entry_from_element(child, false)?;
                feed.add_entry(entry);
            }
            // Foreign markup at feed level has no slot in the model.
            _ => {}
        }
    }
    Ok(feed)
}

fn fold_namespaces(element: &RawElement, registry: &mut crate::core::types::NamespaceRegistry) {
    let locations = schema_location_pairs(element);
    for (attr, value) in &element.attributes {
        let prefix = if attr == "xmlns" {
            None
        } else if let Some(prefix) = attr.strip_prefix("xmlns:") {
            Some(prefix)
        } else {
            continue;
        };
        if value == ATOM_NS || value == GDATA_NS || value == XSI_NS {
            continue;
        }
        match locations.iter().find(|(uri, _)| uri == value) {
            Some((_, location)) => registry.add(Namespace::with_schema_location(
                prefix,
                value.clone(),
                location.clone(),
            )),
            None => registry.add(Namespace::new(prefix, value.clone())),
        }
    }
}

fn schema_location_pairs(element: &RawElement) -> Vec<(String, String)> {
    let Some(raw) = element
        .attributes
        .iter()
        .find(|(attr, _)| local_name(attr) == "schemaLocation")
        .map(|(_, value)| value.as_str())
    else {
        return Vec::new();
    };
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    tokens
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect()
}

fn text_construct(element: &RawElement) -> Result<Text> {
    match element.attribute("type").unwrap_or("text") {
        "text" => Ok(Text::plain(element.trimmed_text())),
        "html" => Ok(Text::html(element.trimmed_text())),
        "xhtml" => Err(AtomPubError::NotImplemented(
            "xhtml text construct".to_string(),
        )),
        other => Err(AtomPubError::BadRequest(format!(
            "unknown text construct type: {}",
            other
        ))),
    }
}

fn person(element: &RawElement) -> Person {
    let mut person = Person::default();
    for child in &element.children {
        match local_name(&child.name) {
            "name" => person.name = child.trimmed_text().to_string(),
            "email" => person.email = Some(child.trimmed_text().to_string()),
            "uri" => person.uri = Some(child.trimmed_text().to_string()),
            _ => {}
        }
    }
    person
}

fn link(element: &RawElement) -> Result<Link> {
    let href = element
        .attribute("href")
        .ok_or_else(|| malformed("link without href"))?;
    Ok(Link {
        rel: element.attribute("rel").map(str::to_string),
        href: href.to_string(),
        media_type: element.attribute("type").map(str::to_string),
        title: element.attribute("title").map(str::to_string),
    })
}

fn timestamp(element: &RawElement) -> Result<chrono::DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(element.trimmed_text()).map_err(|e| {
        AtomPubError::BadRequest(format!(
            "bad timestamp {:?}: {}",
            element.trimmed_text(),
            e
        ))
    })
}

fn extension(element: &RawElement) -> ExtensionElement {
    let text = element.trimmed_text();
    ExtensionElement {
        name: element.name.clone(),
        attributes: element.attributes.clone(),
        text: if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        },
        children: element.children.iter().map(extension).collect(),
    }
}
