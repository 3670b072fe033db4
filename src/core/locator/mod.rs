//! Resource addressing: the URL buffer and the query grammar on top of it.
//!
//! The locator is produced and consumed by both the server dispatcher and
//! the remote proxy: the dispatcher parses an inbound request's locator into
//! category terms and a [`QueryParameters`] bag; the remote proxy builds the
//! same shape outbound from a configured base.

pub mod query;
pub mod url;

pub use query::{
    categories, parameters, QueryParameters, CATEGORY_MARKER, DEFAULT_MAX_RESULTS,
    DEFAULT_START_INDEX, ENTRY_SEGMENT_PREFIX,
};
pub use url::{decode_component, encode_component, ResourceLocator};
