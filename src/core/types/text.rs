//! Text constructs for titles, summaries, rights, and content.
//!
//! Atom text constructs are tagged with a `type` attribute on the wire.
//! Construction is always through a typed constructor; the type is inferred
//! during parse, not stored separately from the variant.

use crate::core::error::{AtomPubError, Result};

/// A tagged text value.
///
/// | Variant | Wire `type` | `format()` |
/// |---------|-------------|------------|
/// | `Plain` | `text` | the value |
/// | `Html` | `html` | the value |
/// | `Xhtml` | `xhtml` | raises `NotImplemented` |
///
/// # Examples
///
/// ```
/// use atompub_http_rs::core::types::Text;
///
/// let title = Text::plain("hello");
/// assert_eq!(title.format().unwrap(), "hello");
/// assert!(Text::Xhtml.format().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Text {
    /// Plain text.
    Plain(String),
    /// Entity-encoded HTML. Decoded plain value is the stored string.
    Html(String),
    /// XHTML div content. Deliberately unimplemented; any use raises.
    Xhtml,
}

impl Text {
    /// Plain text constructor.
    pub fn plain(value: impl Into<String>) -> Self {
        Text::Plain(value.into())
    }

    /// HTML text constructor.
    pub fn html(value: impl Into<String>) -> Self {
        Text::Html(value.into())
    }

    /// The decoded plain value, where defined.
    pub fn format(&self) -> Result<&str> {
        match self {
            Text::Plain(value) | Text::Html(value) => Ok(value),
            Text::Xhtml => Err(AtomPubError::NotImplemented(
                "xhtml text construct".to_string(),
            )),
        }
    }

    /// Wire value of the `type` attribute.
    pub fn type_label(&self) -> &'static str {
        match self {
            Text::Plain(_) => "text",
            Text::Html(_) => "html",
            Text::Xhtml => "xhtml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format() {
        assert_eq!(Text::plain("x").format().unwrap(), "x");
    }

    #[test]
    fn test_html_format() {
        assert_eq!(Text::html("<b>x</b>").format().unwrap(), "<b>x</b>");
    }

    #[test]
    fn test_xhtml_raises() {
        assert!(matches!(
            Text::Xhtml.format(),
            Err(AtomPubError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(Text::plain("").type_label(), "text");
        assert_eq!(Text::html("").type_label(), "html");
        assert_eq!(Text::Xhtml.type_label(), "xhtml");
    }
}
