//! Minimal XML document writer.

use std::borrow::Cow;
use std::fmt::{self, Display, Write};

/// Escapes the five XML special characters.
///
/// Characters XML 1.0 cannot carry at all, such as most C0 controls, are
/// replaced with U+FFFD so the document stays well-formed.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| needs_escape(c) || is_forbidden(c)) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_forbidden(c) => escaped.push(char::REPLACEMENT_CHARACTER),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'')
}

fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Builds an XML document one element per line.
pub(crate) struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    pub(crate) fn open(&mut self, name: &str) -> fmt::Result {
        self.indent();
        writeln!(self.out, "<{name}>")?;
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn close(&mut self, name: &str) -> fmt::Result {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        writeln!(self.out, "</{name}>")
    }

    /// Writes `<name>text</name>` with the text escaped.
    pub(crate) fn element(&mut self, name: &str, text: impl Display) -> fmt::Result {
        let text = text.to_string();
        self.indent();
        writeln!(self.out, "<{name}>{}</{name}>", escape_xml(&text))
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(
            escape_xml("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_escape_xml_replaces_control_characters() {
        assert_eq!(escape_xml("bell\u{7}"), "bell\u{FFFD}");
        assert_eq!(escape_xml("a\u{0}b\u{1B}&"), "a\u{FFFD}b\u{FFFD}&amp;");
        assert_eq!(escape_xml("tab\tline\n"), "tab\tline\n");
    }

    #[test]
    fn test_writer_nests_elements() {
        let mut writer = XmlWriter::new();
        writer.open("response").unwrap();
        writer.element("version", "1.0").unwrap();
        writer.close("response").unwrap();
        let doc = writer.finish();

        assert!(doc.starts_with("<?xml"));
        assert!(doc.contains("  <version>1.0</version>\n"));
        assert!(doc.ends_with("</response>\n"));
    }
}
