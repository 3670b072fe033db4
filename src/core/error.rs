//! Error taxonomy for the AtomPub protocol layer.
//!
//! Every failure in the crate is one of a closed set of kinds, each mapped to
//! an HTTP status code. Adapter-level business failures propagate unchanged to
//! the dispatcher; transport-level failures in the remote proxy are first
//! probed for a server-supplied status and reclassified, and collapse to
//! [`AtomPubError::Internal`] when no response was received at all.
//!
//! # Status Mapping
//!
//! | Kind | Status | Notes |
//! |------|--------|-------|
//! | `BadRequest` | 400 | Malformed locator, wrong category count, bad parameters |
//! | `NotAuthorized` | 401 | Carries a realm for the `WWW-Authenticate` challenge |
//! | `Forbidden` | 403 | Credentials rejected or operation forbidden |
//! | `NotFound` | 404 | Single-entry-by-id miss |
//! | `MethodNotAllowed` | 405 | Adapter default for any unimplemented operation |
//! | `PreconditionFailed` | 412 | ETag mismatch or missing |
//! | `NotImplemented` | 500 | Unimplemented Atom constructs (XHTML, contributors, ...) |
//! | `Internal` | 500 | Transport, serialization, or construction failures |
//!
//! # Examples
//!
//! ```
//! use atompub_http_rs::core::error::AtomPubError;
//!
//! let err = AtomPubError::PreconditionFailed("stale etag".into());
//! assert_eq!(err.status(), 412);
//!
//! let err = AtomPubError::from_status(404, "no such entry");
//! assert!(matches!(err, AtomPubError::NotFound(_)));
//! ```

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AtomPubError>;

/// Closed failure taxonomy, each kind carrying an HTTP status and message.
///
/// No retry is attempted at this layer for any kind; every failure path
/// yields a status code and a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AtomPubError {
    /// Malformed request: wrong category count, bad parameters, unparseable
    /// document body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing credentials. Carries the realm used to build the
    /// `WWW-Authenticate: Basic` challenge header.
    #[error("not authorized: {message}")]
    NotAuthorized {
        message: String,
        realm: String,
    },

    /// Credentials rejected or operation forbidden for this caller.
    #[error("forbidden: {message}")]
    Forbidden {
        message: String,
        realm: Option<String>,
    },

    /// Single-entry-by-id miss. An empty collection query is not an error.
    #[error("not found: {0}")]
    NotFound(String),

    /// The adapter does not support the requested operation.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// ETag precondition failed: the supplied etag is missing or does not
    /// match the store's current value.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// An Atom construct the document model deliberately does not implement
    /// (XHTML text, contributors, category-in-entry, media-link source).
    /// Raised rather than silently dropping data.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Any unexpected failure: malformed URL construction, transport
    /// failure, serialization failure, unreached server.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AtomPubError {
    /// The HTTP status code this failure kind maps to.
    pub fn status(&self) -> u16 {
        match self {
            AtomPubError::BadRequest(_) => 400,
            AtomPubError::NotAuthorized { .. } => 401,
            AtomPubError::Forbidden { .. } => 403,
            AtomPubError::NotFound(_) => 404,
            AtomPubError::MethodNotAllowed(_) => 405,
            AtomPubError::PreconditionFailed(_) => 412,
            AtomPubError::NotImplemented(_) => 500,
            AtomPubError::Internal(_) => 500,
        }
    }

    /// Reclassify a server-supplied status into the matching kind.
    ///
    /// Used by the remote proxy: if the connection got far enough to carry a
    /// status, the response is translated into the matching typed failure;
    /// anything outside the fixed set collapses to `Internal`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => AtomPubError::BadRequest(message),
            401 => AtomPubError::NotAuthorized {
                message,
                realm: String::new(),
            },
            403 => AtomPubError::Forbidden {
                message,
                realm: None,
            },
            404 => AtomPubError::NotFound(message),
            405 => AtomPubError::MethodNotAllowed(message),
            412 => AtomPubError::PreconditionFailed(message),
            _ => AtomPubError::Internal(message),
        }
    }

    /// The challenge header value for kinds that carry a realm.
    ///
    /// Returns `Some("Basic realm=\"...\"")` for `NotAuthorized` (always)
    /// and `Forbidden` (when a realm was attached), `None` otherwise.
    pub fn challenge(&self) -> Option<String> {
        match self {
            AtomPubError::NotAuthorized { realm, .. } => {
                Some(format!("Basic realm=\"{}\"", realm))
            }
            AtomPubError::Forbidden {
                realm: Some(realm), ..
            } => Some(format!("Basic realm=\"{}\"", realm)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AtomPubError::BadRequest("x".into()).status(), 400);
        assert_eq!(
            AtomPubError::NotAuthorized {
                message: "x".into(),
                realm: "r".into()
            }
            .status(),
            401
        );
        assert_eq!(AtomPubError::NotFound("x".into()).status(), 404);
        assert_eq!(AtomPubError::MethodNotAllowed("x".into()).status(), 405);
        assert_eq!(AtomPubError::PreconditionFailed("x".into()).status(), 412);
        assert_eq!(AtomPubError::NotImplemented("x".into()).status(), 500);
        assert_eq!(AtomPubError::Internal("x".into()).status(), 500);
    }

    #[test]
    fn test_from_status_round_trip() {
        for status in [400u16, 401, 403, 404, 405, 412] {
            let err = AtomPubError::from_status(status, "m");
            assert_eq!(err.status(), status);
        }
    }

    #[test]
    fn test_from_status_unknown_collapses_to_internal() {
        assert!(matches!(
            AtomPubError::from_status(502, "bad gateway"),
            AtomPubError::Internal(_)
        ));
        assert!(matches!(
            AtomPubError::from_status(500, "boom"),
            AtomPubError::Internal(_)
        ));
    }

    #[test]
    fn test_challenge_header() {
        let err = AtomPubError::NotAuthorized {
            message: "credentials required".into(),
            realm: "atompub".into(),
        };
        assert_eq!(err.challenge(), Some("Basic realm=\"atompub\"".into()));

        let err = AtomPubError::Forbidden {
            message: "nope".into(),
            realm: None,
        };
        assert_eq!(err.challenge(), None);
    }
}
