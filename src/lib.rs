//! See [`core`] for the full module tour.

pub mod core;

pub use crate::core::{AtomPubError, Entry, Feed, QueryParameters, ResourceLocator, Result};
