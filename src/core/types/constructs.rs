//! Small Atom value records: Person, Link, Category, Generator.

use serde::{Deserialize, Serialize};

/// An Atom person construct (`author`).
///
/// Contributors are deliberately unimplemented; parsing one raises rather
/// than silently dropping it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Person {
            name: name.into(),
            email: None,
            uri: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// An Atom link construct.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: Option<String>,
    pub href: String,
    pub media_type: Option<String>,
    pub title: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Link {
            rel: None,
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The synthesized self link pointing at an entry's own URI.
    pub fn self_link(uri: impl Into<String>) -> Self {
        Link::new(uri)
            .with_rel("self")
            .with_media_type("application/atom+xml")
    }

    pub fn is_self(&self) -> bool {
        self.rel.as_deref() == Some("self")
    }
}

/// An Atom category construct.
///
/// Category elements inside an Entry are deliberately unimplemented on the
/// wire; categories live in the locator path, where the query grammar
/// extracts them as these records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub term: String,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

impl Category {
    pub fn new(term: impl Into<String>) -> Self {
        Category {
            term: term.into(),
            scheme: None,
            label: None,
        }
    }
}

/// Feed-level tool identity (`generator`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub name: String,
    pub uri: Option<String>,
    pub version: Option<String>,
}

impl Generator {
    pub fn new(name: impl Into<String>) -> Self {
        Generator {
            name: name.into(),
            uri: None,
            version: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}
