//! A collection wrapper around entries.

use chrono::{DateTime, FixedOffset, Utc};

use crate::core::types::constructs::{Generator, Link, Person};
use crate::core::types::entry::Entry;
use crate::core::types::namespace::NamespaceRegistry;
use crate::core::types::text::Text;

/// A one-shot forward iterator of entries, e.g. over a store cursor.
///
/// Once exhausted it is not restartable. Each `next()` call is a potential
/// blocking point (the source may fetch the next row); the serialization
/// loop holds no lock across it.
pub type EntrySource = Box<dyn Iterator<Item = Entry> + Send>;

/// An Atom feed: collection-level metadata plus entries.
///
/// Explicitly-added entries serialize first, then the lazy source's entries
/// in its own order, one at a time, never materialized simultaneously. This
/// ordering is part of the observable contract.
#[derive(Default)]
pub struct Feed {
    pub id: Option<String>,
    pub title: Option<Text>,
    /// Defaults to creation time.
    pub updated: Option<DateTime<FixedOffset>>,
    pub authors: Vec<Person>,
    pub links: Vec<Link>,
    pub generator: Option<Generator>,
    /// Explicitly-added entries, in insertion order.
    pub entries: Vec<Entry>,
    /// Lazily pulled entry source, logically after the explicit entries.
    pub source: Option<EntrySource>,
    pub namespaces: NamespaceRegistry,
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("updated", &self.updated)
            .field("entries", &self.entries.len())
            .field("lazy_source", &self.source.is_some())
            .finish()
    }
}

impl Feed {
    /// A fresh feed with `updated` defaulted to now.
    pub fn new() -> Self {
        Feed {
            updated: Some(Utc::now().fixed_offset()),
            ..Default::default()
        }
    }

    /// An entirely empty feed, for parsers that fill every field.
    pub fn empty() -> Self {
        Feed::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: Text) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_updated(mut self, updated: DateTime<FixedOffset>) -> Self {
        self.updated = Some(updated);
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

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Append an explicit entry, folding its namespace declarations up into
    /// this feed's root registry.
    pub fn add_entry(&mut self, entry: Entry) {
        self.namespaces.merge(&entry.namespaces);
        self.entries.push(entry);
    }

    /// Builder form of [`Feed::add_entry`].
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.add_entry(entry);
        self
    }

    /// Attach the lazy entry source. Its elements are appended logically
    /// after the explicit entries.
    pub fn set_entry_source(&mut self, source: EntrySource) {
        self.source = Some(source);
    }
}
