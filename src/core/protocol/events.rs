//! Structural XML event sequence shared by both serialization call shapes.
//!
//! The document model renders through a push-style traversal emitting
//! start-element / characters / end-element events into an [`EventSink`].
//! The byte renderer is one sink; indentation is a pure sink-to-sink filter
//! layered in front of it, so prettyprinting never touches the traversal.
//!
//! ```text
//! Feed/Entry ──events──▶ [Indenter] ──events──▶ XmlRenderer ──bytes──▶ sink
//! ```
//!
//! Escaping happens exactly once, inside [`XmlRenderer`], at the
//! text-emission boundary.

use std::io::Write;

use crate::core::error::{AtomPubError, Result};
use crate::core::protocol::escape::escape_text;

/// One structural event of a document traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element open tag with its attributes, in emission order.
    StartElement {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// A text node. Carried unescaped; the renderer escapes on emission.
    Characters(String),
    /// Element close tag.
    EndElement { name: String },
}

impl XmlEvent {
    /// Start-element event with no attributes.
    pub fn start(name: impl Into<String>) -> Self {
        XmlEvent::StartElement {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Start-element event with attributes.
    pub fn start_with(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        XmlEvent::StartElement {
            name: name.into(),
            attributes,
        }
    }

    /// Text event.
    pub fn text(value: impl Into<String>) -> Self {
        XmlEvent::Characters(value.into())
    }

    /// End-element event.
    pub fn end(name: impl Into<String>) -> Self {
        XmlEvent::EndElement { name: name.into() }
    }
}

/// Consumer of a structural event sequence.
///
/// Implemented by the byte renderer and by the indentation filter. The
/// sequence is lazy, finite, and non-restartable: a producer pushes each
/// event exactly once, in document order.
pub trait EventSink {
    fn event(&mut self, event: XmlEvent) -> Result<()>;
}

/// Renders events as UTF-8 bytes into any [`std::io::Write`].
///
/// Collapses an empty element (start immediately followed by its end) into
/// the self-closing form. Text and attribute values are escaped here and
/// nowhere else.
pub struct XmlRenderer<W: Write> {
    out: W,
    /// Open tag awaiting either content or an immediate close.
    pending_start: Option<(String, Vec<(String, String)>)>,
}

impl<W: Write> XmlRenderer<W> {
    pub fn new(out: W) -> Self {
        XmlRenderer {
            out,
            pending_start: None,
        }
    }

    /// Finish rendering and hand the sink back.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_pending(false)?;
        Ok(self.out)
    }

    fn write(&mut self, s: &str) -> Result<()> {
        self.out
            .write_all(s.as_bytes())
            .map_err(|e| AtomPubError::Internal(format!("serialization failure: {}", e)))
    }

    fn flush_pending(&mut self, self_close: bool) -> Result<()> {
        if let Some((name, attributes)) = self.pending_start.take() {
            let mut tag = String::with_capacity(name.len() + 2);
            tag.push('<');
            tag.push_str(&name);
            for (attr, value) in &attributes {
                tag.push(' ');
                tag.push_str(attr);
                tag.push_str("=\"");
                tag.push_str(&escape_text(value));
                tag.push('"');
            }
            tag.push_str(if self_close { "/>" } else { ">" });
            self.write(&tag)?;
        }
        Ok(())
    }
}

impl<W: Write> EventSink for XmlRenderer<W> {
    fn event(&mut self, event: XmlEvent) -> Result<()> {
        match event {
            XmlEvent::StartElement { name, attributes } => {
                self.flush_pending(false)?;
                self.pending_start = Some((name, attributes));
                Ok(())
            }
            XmlEvent::Characters(text) => {
                self.flush_pending(false)?;
                let escaped = escape_text(&text);
                self.write(&escaped)
            }
            XmlEvent::EndElement { name } => {
                if self.pending_start.is_some() {
                    self.flush_pending(true)
                } else {
                    self.write(&format!("</{}>", name))
                }
            }
        }
    }
}

/// Pure event filter that inserts indentation between structural events.
///
/// Elements containing only text stay on one line; elements with child
/// elements get their children on indented lines. Wrap this around any
/// downstream sink to prettyprint without changing the producer.
pub struct Indenter<'a> {
    inner: &'a mut dyn EventSink,
    depth: usize,
    /// Whether the current element has emitted child elements.
    child_stack: Vec<bool>,
    saw_text: bool,
}

impl<'a> Indenter<'a> {
    pub fn new(inner: &'a mut dyn EventSink) -> Self {
        Indenter {
            inner,
            depth: 0,
            child_stack: Vec::new(),
            saw_text: false,
        }
    }

    fn newline(&mut self, depth: usize) -> Result<()> {
        let mut ws = String::with_capacity(1 + depth * 2);
        ws.push('\n');
        for _ in 0..depth {
            ws.push_str("  ");
        }
        self.inner.event(XmlEvent::Characters(ws))
    }
}

impl EventSink for Indenter<'_> {
    fn event(&mut self, event: XmlEvent) -> Result<()> {
        match event {
            start @ XmlEvent::StartElement { .. } => {
                if self.depth > 0 {
                    if let Some(has_children) = self.child_stack.last_mut() {
                        *has_children = true;
                    }
                    self.newline(self.depth)?;
                }
                self.inner.event(start)?;
                self.child_stack.push(false);
                self.depth += 1;
                self.saw_text = false;
                Ok(())
            }
            text @ XmlEvent::Characters(_) => {
                self.saw_text = true;
                self.inner.event(text)
            }
            end @ XmlEvent::EndElement { .. } => {
                self.depth = self.depth.saturating_sub(1);
                let had_children = self.child_stack.pop().unwrap_or(false);
                if had_children && !self.saw_text {
                    self.newline(self.depth)?;
                }
                self.saw_text = false;
                self.inner.event(end)
            }
        }
    }
}
