//! Core document model for the AtomPub protocol.
//!
//! In-memory representation of Atom constructs, built via explicit setters
//! and rendered or parsed by the [`crate::core::protocol`] module.
//!
//! # Type Hierarchy
//!
//! ```text
//! Feed ─── collection metadata, explicit entries, lazy entry source
//!  └── Entry ─── one addressable resource version
//!       ├── Text      (Plain | Html | Xhtml)
//!       ├── Person    (author)
//!       ├── Link      (self + others)
//!       └── ExtensionElement (named, attributed, nested)
//! Namespace / NamespaceRegistry ─── root-level xmlns declarations
//! ```
//!
//! # Key Invariants
//!
//! - An [`Entry`] etag is `None` only before creation; every entry handed
//!   back after a create or update carries a current etag.
//! - A [`Feed`] serializes its explicit entries before its lazily pulled
//!   source, each sub-sequence in its own order.
//! - Namespace declarations collect on the root element only; adding an
//!   entry to a feed folds the entry's namespaces upward.

mod constructs;
mod entry;
mod extension;
mod feed;
mod namespace;
mod text;

pub use constructs::{Category, Generator, Link, Person};
pub use entry::Entry;
pub use extension::ExtensionElement;
pub use feed::{EntrySource, Feed};
pub use namespace::{Namespace, NamespaceRegistry, ATOM_NS, GDATA_NS, XSI_NS};
pub use text::Text;
