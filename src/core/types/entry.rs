//! One addressable resource version.

use chrono::{DateTime, FixedOffset, Utc};

use crate::core::types::constructs::{Link, Person};
use crate::core::types::extension::ExtensionElement;
use crate::core::types::namespace::NamespaceRegistry;
use crate::core::types::text::Text;

/// An Atom entry: one resource version.
///
/// The id is server-assigned and opaque; `uri` is the entry's self link.
/// The etag is `None` only for an entry about to be created — every entry
/// returned to a caller after creation or mutation carries a current etag.
///
/// # Examples
///
/// ```
/// use atompub_http_rs::core::types::{Entry, Text, Person};
///
/// let entry = Entry::new()
///     .with_title(Text::plain("hello"))
///     .with_author(Person::new("Ada"));
/// assert!(entry.etag.is_none());
/// assert!(entry.updated.is_some());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry {
    /// Server-assigned opaque identifier.
    pub id: Option<String>,
    /// Self-link target.
    pub uri: Option<String>,
    /// Strong-etag raw value; `None` only pre-create.
    pub etag: Option<String>,
    pub title: Option<Text>,
    pub summary: Option<Text>,
    pub rights: Option<Text>,
    pub content: Option<Text>,
    pub authors: Vec<Person>,
    /// Ordered links. Serialization synthesizes a `self` link from `uri`
    /// ahead of these.
    pub links: Vec<Link>,
    pub published: Option<DateTime<FixedOffset>>,
    /// Defaults to creation time.
    pub updated: Option<DateTime<FixedOffset>>,
    pub extensions: Vec<ExtensionElement>,
    pub namespaces: NamespaceRegistry,
}

impl Entry {
    /// A fresh entry with `updated` defaulted to now.
    pub fn new() -> Self {
        Entry {
            updated: Some(Utc::now().fixed_offset()),
            ..Default::default()
        }
    }

    /// An entirely empty entry, for parsers that fill every field.
    pub fn empty() -> Self {
        Entry::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_title(mut self, title: Text) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_summary(mut self, summary: Text) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_rights(mut self, rights: Text) -> Self {
        self.rights = Some(rights);
        self
    }

    pub fn with_content(mut self, content: Text) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_author(mut self, author: Person) -> Self {
        self.authors.push(author);
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_published(mut self, published: DateTime<FixedOffset>) -> Self {
        self.published = Some(published);
        self
    }

    pub fn with_updated(mut self, updated: DateTime<FixedOffset>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn with_extension(mut self, extension: ExtensionElement) -> Self {
        self.extensions.push(extension);
        self
    }

    /// First extension element with the given name.
    pub fn extension(&self, name: &str) -> Option<&ExtensionElement> {
        self.extensions.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_updated() {
        let entry = Entry::new();
        assert!(entry.updated.is_some());
        assert!(entry.published.is_none());
        assert!(entry.etag.is_none());
    }

    #[test]
    fn test_empty_has_no_updated() {
        assert!(Entry::empty().updated.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let entry = Entry::new()
            .with_id("42")
            .with_etag("7")
            .with_title(Text::plain("t"))
            .with_extension(ExtensionElement::new("x:a").with_text("v"));
        assert_eq!(entry.id.as_deref(), Some("42"));
        assert_eq!(entry.extension("x:a").unwrap().text.as_deref(), Some("v"));
        assert!(entry.extension("x:b").is_none());
    }
}
