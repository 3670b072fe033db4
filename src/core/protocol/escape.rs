//! Text escaping at the wire boundary.
//!
//! Escaping of `"`, `&`, `<`, `>` and stripping of bare carriage returns
//! happens exactly once, at the text-emission boundary. The event writer is
//! the only caller of [`escape_text`]; nothing upstream pre-escapes, so
//! already-escaped text is never escaped twice.
//!
//! Unescaping on parse recognizes exactly the four named entities and passes
//! an unterminated `&...` sequence through literally. This leniency is a
//! deliberate narrowing of the XML entity set and is preserved as observed
//! behavior, not fixed to strict entity handling.

/// Escape `"`, `&`, `<`, `>` and strip bare carriage returns.
///
/// Applied once per text node and attribute value during emission.
///
/// # Examples
///
/// ```
/// use atompub_http_rs::core::protocol::escape_text;
///
/// assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_text("line\r\nnext"), "line\nnext");
/// ```
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Decode the four named entities; unrecognized or unterminated `&...`
/// sequences pass through unchanged.
///
/// # Examples
///
/// ```
/// use atompub_http_rs::core::protocol::unescape_text;
///
/// assert_eq!(unescape_text("a &lt; b &amp; c"), "a < b & c");
/// assert_eq!(unescape_text("fish &chips"), "fish &chips");
/// assert_eq!(unescape_text("&#65;"), "&#65;");
/// ```
pub fn unescape_text(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len());
    let mut rest = wire;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(semi) => {
                let entity = &tail[..=semi];
                match entity {
                    "&quot;" => out.push('"'),
                    "&amp;" => out.push('&'),
                    "&lt;" => out.push('<'),
                    "&gt;" => out.push('>'),
                    // Unrecognized entity: keep it verbatim.
                    _ => out.push_str(entity),
                }
                rest = &tail[semi + 1..];
            }
            None => {
                // Unterminated sequence: pass the rest through literally.
                out.push_str(tail);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
