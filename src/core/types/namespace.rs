//! XML namespace declarations and the per-root registry.
//!
//! A root element (Entry, Feed) accumulates namespaces as an
//! ordered-unique-by-URI map, serialized as `xmlns[:prefix]` attributes on
//! the root only — never on descendant elements, even when contributed by a
//! nested construct during composition. Adding an Entry to a Feed folds the
//! entry's namespaces up into the feed's registry.

/// The Atom namespace (RFC 4287).
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// The GData extension namespace carrying the `gd:etag` attribute.
pub const GDATA_NS: &str = "http://schemas.google.com/g/2005";

/// The XML Schema Instance namespace used for `xsi:schemaLocation`.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// One namespace declaration. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    prefix: Option<String>,
    uri: String,
    schema_location: Option<String>,
}

impl Namespace {
    pub fn new(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        Namespace {
            prefix: prefix.map(str::to_string),
            uri: uri.into(),
            schema_location: None,
        }
    }

    pub fn with_schema_location(
        prefix: Option<&str>,
        uri: impl Into<String>,
        schema_location: impl Into<String>,
    ) -> Self {
        Namespace {
            prefix: prefix.map(str::to_string),
            uri: uri.into(),
            schema_location: Some(schema_location.into()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn schema_location(&self) -> Option<&str> {
        self.schema_location.as_deref()
    }

    /// The attribute name this declaration serializes under.
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        }
    }
}

/// Ordered-unique-by-URI namespace collection carried by a root element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceRegistry {
    namespaces: Vec<Namespace>,
    /// Aggregated `xsi:schemaLocation`, rebuilt whenever a namespace with a
    /// schema location is added.
    schema_locations: Option<String>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        NamespaceRegistry::default()
    }

    /// Add a declaration; a URI already present is kept in its original
    /// position with its original prefix.
    pub fn add(&mut self, namespace: Namespace) {
        if self.namespaces.iter().any(|n| n.uri() == namespace.uri()) {
            return;
        }
        self.namespaces.push(namespace);
        self.rebuild_schema_locations();
    }

    /// Fold another registry's declarations into this one, preserving order.
    pub fn merge(&mut self, other: &NamespaceRegistry) {
        for namespace in &other.namespaces {
            self.add(namespace.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// The aggregated `xsi:schemaLocation` value, when any declaration
    /// carries a schema location.
    pub fn schema_location(&self) -> Option<&str> {
        self.schema_locations.as_deref()
    }

    fn rebuild_schema_locations(&mut self) {
        let mut parts = Vec::new();
        for namespace in &self.namespaces {
            if let Some(location) = namespace.schema_location() {
                parts.push(format!("{} {}", namespace.uri(), location));
            }
        }
        self.schema_locations = if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_name() {
        assert_eq!(Namespace::new(None, "urn:a").attribute_name(), "xmlns");
        assert_eq!(
            Namespace::new(Some("gd"), GDATA_NS).attribute_name(),
            "xmlns:gd"
        );
    }

    #[test]
    fn test_unique_by_uri() {
        let mut registry = NamespaceRegistry::new();
        registry.add(Namespace::new(Some("a"), "urn:x"));
        registry.add(Namespace::new(Some("b"), "urn:x"));
        let collected: Vec<_> = registry.iter().collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].prefix(), Some("a"));
    }

    #[test]
    fn test_schema_location_aggregation() {
        let mut registry = NamespaceRegistry::new();
        registry.add(Namespace::with_schema_location(
            Some("a"),
            "urn:x",
            "http://h/x.xsd",
        ));
        registry.add(Namespace::new(Some("b"), "urn:y"));
        registry.add(Namespace::with_schema_location(
            Some("c"),
            "urn:z",
            "http://h/z.xsd",
        ));
        assert_eq!(
            registry.schema_location(),
            Some("urn:x http://h/x.xsd urn:z http://h/z.xsd")
        );
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut first = NamespaceRegistry::new();
        first.add(Namespace::new(Some("a"), "urn:a"));
        let mut second = NamespaceRegistry::new();
        second.add(Namespace::new(Some("b"), "urn:b"));
        second.add(Namespace::new(Some("a2"), "urn:a"));
        first.merge(&second);
        let uris: Vec<_> = first.iter().map(|n| n.uri().to_string()).collect();
        assert_eq!(uris, vec!["urn:a", "urn:b"]);
    }
}
