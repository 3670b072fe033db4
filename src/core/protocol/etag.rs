//! Strong entity-tag encoding and the optimistic-concurrency convention.
//!
//! Every addressable resource version carries an opaque etag. On the wire it
//! travels as a *strong* entity tag: the raw value, backslash-escaped and
//! wrapped in double quotes. [`make_strong`] and [`parse_strong`] are exact
//! inverses for any raw string.
//!
//! Mutation preconditions: an update or delete must carry the current strong
//! etag in an `If-Match` channel; the store compares against its current
//! value and signals [`AtomPubError::PreconditionFailed`] on mismatch. A
//! missing etag on update/delete is itself a precondition failure. Every
//! successful create/update returns a fresh, different etag.
//!
//! # Version-number convention
//!
//! Stores that version by counter can layer an integer version on top of the
//! string etag via [`etag_from_version`] / [`version_from_etag`]. This is
//! optional sugar, not required by the protocol.
//!
//! # Examples
//!
//! ```
//! use atompub_http_rs::core::protocol::{make_strong, parse_strong};
//!
//! let wire = make_strong(r#"v"7"#);
//! assert_eq!(wire, r#""v\"7""#);
//! assert_eq!(parse_strong(&wire).unwrap(), r#"v"7"#);
//! ```

use crate::core::error::{AtomPubError, Result};

/// Encode a raw etag value as a strong entity tag.
///
/// Backslashes and double quotes in the raw value are backslash-escaped,
/// then the whole value is wrapped in double quotes.
pub fn make_strong(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Decode a strong entity tag back to its raw value.
///
/// Exact inverse of [`make_strong`]. Weak tags (`W/"..."`) and values not
/// wrapped in double quotes are rejected as precondition failures since a
/// mutation carrying them can never match a strong comparison.
pub fn parse_strong(wire: &str) -> Result<String> {
    let trimmed = wire.trim();
    if trimmed.starts_with("W/") {
        return Err(AtomPubError::PreconditionFailed(format!(
            "weak entity tag not acceptable: {}",
            wire
        )));
    }
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| {
            AtomPubError::PreconditionFailed(format!("malformed entity tag: {}", wire))
        })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => {
                    return Err(AtomPubError::PreconditionFailed(format!(
                        "dangling escape in entity tag: {}",
                        wire
                    )))
                }
            }
        } else if c == '"' {
            return Err(AtomPubError::PreconditionFailed(format!(
                "unescaped quote in entity tag: {}",
                wire
            )));
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Render a counter version as a raw etag value.
#[inline]
pub fn etag_from_version(version: u64) -> String {
    version.to_string()
}

/// Read a counter version back out of a raw etag value.
///
/// Fails with `PreconditionFailed` when the etag was not produced by
/// [`etag_from_version`].
pub fn version_from_etag(raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| {
        AtomPubError::PreconditionFailed(format!("etag is not a counter version: {}", raw))
    })
}
