//! Wire protocol: serialization, parsing, etags, and constants.
//!
//! Everything that touches the `application/atom+xml` representation lives
//! here. The document model in [`crate::core::types`] stays wire-agnostic;
//! this module turns it into bytes and back.
//!
//! # Module Organization
//!
//! ```text
//! protocol/
//! ├── constants  - header names, media type, protocol version, statuses
//! ├── escape     - markup escaping and lenient entity decoding
//! ├── etag       - strong-etag quoting and version counters
//! ├── events     - push-style markup events, renderer, pretty-printer
//! ├── writer     - Entry/Feed to bytes
//! └── reader     - bytes to Entry/Feed
//! ```
//!
//! # Serialization Styles
//!
//! Both output styles run through the same event stream: the compact form
//! renders events directly, the pretty form pipes them through an
//! [`Indenter`] first. What differs is whitespace, never content.
//!
//! # Examples
//!
//! ```
//! use atompub_http_rs::core::protocol::{entry_to_bytes, parse_entry};
//! use atompub_http_rs::core::types::{Entry, Text};
//!
//! let entry = Entry::new()
//!     .with_id("urn:offer:1")
//!     .with_title(Text::Plain("Garden gnome".into()));
//!
//! let bytes = entry_to_bytes(&entry, false).unwrap();
//! let parsed = parse_entry(&bytes).unwrap();
//! assert_eq!(parsed.id.as_deref(), Some("urn:offer:1"));
//! ```

pub mod constants;
pub mod escape;
pub mod etag;
pub mod events;
pub mod reader;
pub mod writer;

pub use constants::{ATOM_MEDIA_TYPE, PROTOCOL_VERSION};
pub use escape::{escape_text, unescape_text};
pub use etag::{etag_from_version, make_strong, parse_strong, version_from_etag};
pub use events::{EventSink, Indenter, XmlEvent, XmlRenderer};
pub use reader::{parse_body, parse_entry, parse_feed, ParsedDocument};
pub use writer::{entry_to_bytes, feed_to_bytes, write_entry, write_feed, XML_DECLARATION};
