//! Protocol constants: header names, media types, status codes.

/// Header names used on the wire.
pub mod headers {
    /// Strong-etag precondition on update/delete.
    pub const IF_MATCH: &str = "If-Match";
    /// Create-time naming hint, percent-decoded by the dispatcher.
    pub const SLUG: &str = "Slug";
    /// Response header on single create, pointing at the new self-URI.
    pub const LOCATION: &str = "Location";
    /// PUT→POST simulation for intermediaries that mishandle POST bodies
    /// under Basic authentication.
    pub const METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";
    /// Sent on every outbound request by the remote proxy.
    pub const GDATA_VERSION: &str = "GData-Version";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const COOKIE: &str = "Cookie";
    pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// Wire protocol version sent in the `GData-Version` header.
pub const PROTOCOL_VERSION: &str = "2";

/// Media type of every entry and feed body.
pub const ATOM_MEDIA_TYPE: &str = "application/atom+xml; charset=UTF-8";

/// Status codes with protocol meaning.
pub mod status {
    /// Read, update, delete, and batch success.
    pub const OK: u16 = 200;
    /// Single create, with a `Location` header.
    pub const CREATED: u16 = 201;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_AUTHORIZED: u16 = 401;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    pub const PRECONDITION_FAILED: u16 = 412;
    pub const INTERNAL: u16 = 500;
}
