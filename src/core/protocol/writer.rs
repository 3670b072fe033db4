//! Push-style Atom emission.
//!
//! Renders a [`Feed`] or [`Entry`] once to a byte sink as a sequence of
//! structural events. Element order is fixed by the content model: root
//! attributes, then authors, content, id, self-link, other links,
//! published, title, summary, rights, updated, extensions — and for a feed,
//! generator and entries last.
//!
//! Feed serialization drains the explicit entries before the lazy entry
//! source, in that order; the source is pulled one element at a time and is
//! never materialized in memory.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::core::error::Result;
use crate::core::protocol::etag::make_strong;
use crate::core::protocol::events::{EventSink, Indenter, XmlEvent, XmlRenderer};
use crate::core::types::{
    Entry, ExtensionElement, Feed, Generator, Link, NamespaceRegistry, Person, Text, ATOM_NS,
    GDATA_NS, XSI_NS,
};

pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Render an entry as a standalone `application/atom+xml` document.
pub fn entry_to_bytes(entry: &Entry, pretty: bool) -> Result<Bytes> {
    let mut out = Vec::new();
    out.extend_from_slice(XML_DECLARATION.as_bytes());
    let mut renderer = XmlRenderer::new(out);
    if pretty {
        let mut indenter = Indenter::new(&mut renderer);
        write_entry(entry, true, &mut indenter)?;
    } else {
        write_entry(entry, true, &mut renderer)?;
    }
    Ok(Bytes::from(renderer.into_inner()?))
}

/// Render a feed as a standalone `application/atom+xml` document,
/// consuming it so the lazy entry source can be drained.
pub fn feed_to_bytes(feed: Feed, pretty: bool) -> Result<Bytes> {
    let mut out = Vec::new();
    out.extend_from_slice(XML_DECLARATION.as_bytes());
    let mut renderer = XmlRenderer::new(out);
    if pretty {
        let mut indenter = Indenter::new(&mut renderer);
        write_feed(feed, &mut indenter)?;
    } else {
        write_feed(feed, &mut renderer)?;
    }
    Ok(Bytes::from(renderer.into_inner()?))
}

/// Emit one entry into the sink.
///
/// A root entry carries the namespace declarations; a nested entry (inside
/// a feed) leaves them to the enclosing root.
pub fn write_entry(entry: &Entry, is_root: bool, sink: &mut dyn EventSink) -> Result<()> {
    let mut attributes = Vec::new();
    if let Some(etag) = &entry.etag {
        attributes.push(("gd:etag".to_string(), make_strong(etag)));
    }
    if is_root {
        attributes.extend(root_attributes(&entry.namespaces, entry.etag.is_some()));
    }
    sink.event(XmlEvent::start_with("entry", attributes))?;

    for author in &entry.authors {
        write_person("author", author, sink)?;
    }
    if let Some(content) = &entry.content {
        write_text_construct("content", content, sink)?;
    }
    if let Some(id) = &entry.id {
        write_simple("id", id, sink)?;
    }
    if let Some(uri) = &entry.uri {
        write_link(&Link::self_link(uri.clone()), sink)?;
    }
    for link in &entry.links {
        write_link(link, sink)?;
    }
    if let Some(published) = &entry.published {
        write_timestamp("published", published, sink)?;
    }
    if let Some(title) = &entry.title {
        write_text_construct("title", title, sink)?;
    }
    if let Some(summary) = &entry.summary {
        write_text_construct("summary", summary, sink)?;
    }
    if let Some(rights) = &entry.rights {
        write_text_construct("rights", rights, sink)?;
    }
    if let Some(updated) = &entry.updated {
        write_timestamp("updated", updated, sink)?;
    }
    for extension in &entry.extensions {
        write_extension(extension, sink)?;
    }

    sink.event(XmlEvent::end("entry"))
}

/// Emit the whole feed into the sink: metadata, explicit entries, then the
/// lazy source in its own order.
pub fn write_feed(mut feed: Feed, sink: &mut dyn EventSink) -> Result<()> {
    let attributes = root_attributes(&feed.namespaces, true);
    sink.event(XmlEvent::start_with("feed", attributes))?;

    if let Some(id) = &feed.id {
        write_simple("id", id, sink)?;
    }
    if let Some(title) = &feed.title {
        write_text_construct("title", title, sink)?;
    }
    if let Some(updated) = &feed.updated {
        write_timestamp("updated", updated, sink)?;
    }
    for author in &feed.authors {
        write_person("author", author, sink)?;
    }
    for link in &feed.links {
        write_link(link, sink)?;
    }
    if let Some(generator) = &feed.generator {
        write_generator(generator, sink)?;
    }

    for entry in &feed.entries {
        write_entry(entry, false, sink)?;
    }
    // One-shot source: each pull may block on the underlying cursor, so the
    // loop holds nothing across it and never collects the items.
    if let Some(source) = feed.source.take() {
        for entry in source {
            write_entry(&entry, false, sink)?;
        }
    }

    sink.event(XmlEvent::end("feed"))
}

fn root_attributes(namespaces: &NamespaceRegistry, with_gd: bool) -> Vec<(String, String)> {
    let mut attributes = vec![("xmlns".to_string(), ATOM_NS.to_string())];
    if with_gd {
        attributes.push(("xmlns:gd".to_string(), GDATA_NS.to_string()));
    }
    for namespace in namespaces.iter() {
        if namespace.uri() == ATOM_NS || namespace.uri() == GDATA_NS {
            continue;
        }
        attributes.push((namespace.attribute_name(), namespace.uri().to_string()));
    }
    if let Some(locations) = namespaces.schema_location() {
        attributes.push(("xmlns:xsi".to_string(), XSI_NS.to_string()));
        attributes.push(("xsi:schemaLocation".to_string(), locations.to_string()));
    }
    attributes
}

fn write_simple(name: &str, value: &str, sink: &mut dyn EventSink) -> Result<()> {
    sink.event(XmlEvent::start(name))?;
    sink.event(XmlEvent::text(value))?;
    sink.event(XmlEvent::end(name))
}

fn write_text_construct(name: &str, text: &Text, sink: &mut dyn EventSink) -> Result<()> {
    // format() raises NotImplemented for XHTML before anything is emitted.
    let value = text.format()?;
    sink.event(XmlEvent::start_with(
        name,
        vec![("type".to_string(), text.type_label().to_string())],
    ))?;
    sink.event(XmlEvent::text(value))?;
    sink.event(XmlEvent::end(name))
}

fn write_timestamp(
    name: &str,
    value: &DateTime<FixedOffset>,
    sink: &mut dyn EventSink,
) -> Result<()> {
    write_simple(name, &value.to_rfc3339_opts(SecondsFormat::Secs, false), sink)
}

fn write_person(name: &str, person: &Person, sink: &mut dyn EventSink) -> Result<()> {
    sink.event(XmlEvent::start(name))?;
    write_simple("name", &person.name, sink)?;
    if let Some(email) = &person.email {
        write_simple("email", email, sink)?;
    }
    if let Some(uri) = &person.uri {
        write_simple("uri", uri, sink)?;
    }
    sink.event(XmlEvent::end(name))
}

fn write_link(link: &Link, sink: &mut dyn EventSink) -> Result<()> {
    let mut attributes = Vec::new();
    if let Some(rel) = &link.rel {
        attributes.push(("rel".to_string(), rel.clone()));
    }
    if let Some(media_type) = &link.media_type {
        attributes.push(("type".to_string(), media_type.clone()));
    }
    attributes.push(("href".to_string(), link.href.clone()));
    if let Some(title) = &link.title {
        attributes.push(("title".to_string(), title.clone()));
    }
    sink.event(XmlEvent::start_with("link", attributes))?;
    sink.event(XmlEvent::end("link"))
}

fn write_generator(generator: &Generator, sink: &mut dyn EventSink) -> Result<()> {
    let mut attributes = Vec::new();
    if let Some(uri) = &generator.uri {
        attributes.push(("uri".to_string(), uri.clone()));
    }
    if let Some(version) = &generator.version {
        attributes.push(("version".to_string(), version.clone()));
    }
    sink.event(XmlEvent::start_with("generator", attributes))?;
    sink.event(XmlEvent::text(&generator.name))?;
    sink.event(XmlEvent::end("generator"))
}

fn write_extension(extension: &ExtensionElement, sink: &mut dyn EventSink) -> Result<()> {
    sink.event(XmlEvent::start_with(
        &extension.name,
        extension.attributes.clone(),
    ))?;
    if let Some(text) = &extension.text {
        sink.event(XmlEvent::text(text))?;
    }
    for child in &extension.children {
        write_extension(child, sink)?;
    }
    sink.event(XmlEvent::end(&extension.name))
}
