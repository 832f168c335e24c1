//! Response format selection.

use std::fmt;

use crate::render::{CompactRenderer, JsonRenderer, Renderer, TextRenderer, XmlRenderer};

/// Response format, chosen by the extension of the requested resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `.json`: events as objects
    Json,
    /// `.js`: events as positional arrays
    Compact,
    /// `.xml`
    Xml,
    /// `.txt`: human readable digest
    Text,
}

impl Format {
    /// Resolves a format from a path extension such as `json` or `txt`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "json" => Some(Format::Json),
            "js" => Some(Format::Compact),
            "xml" => Some(Format::Xml),
            "txt" => Some(Format::Text),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Compact => "js",
            Format::Xml => "xml",
            Format::Text => "txt",
        }
    }

    /// Value of the `Content-Type` header for bodies in this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json | Format::Compact => "application/json; charset=UTF-8",
            Format::Xml => "application/xml",
            Format::Text => "text/plain",
        }
    }

    /// Returns the renderer producing bodies in this format.
    pub fn renderer(&self) -> &'static dyn Renderer {
        match self {
            Format::Json => &JsonRenderer,
            Format::Compact => &CompactRenderer,
            Format::Xml => &XmlRenderer,
            Format::Text => &TextRenderer,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which tags accompany an event listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagsMode {
    /// No tags section.
    #[default]
    None,
    /// Tags of the events in the listing.
    Matched,
    /// Every tag the owner has ever used.
    All,
}

impl TagsMode {
    /// Parses the `include_tags` query parameter. Unknown values mean no tags.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("yes" | "true" | "1") => TagsMode::Matched,
            Some("all") => TagsMode::All,
            _ => TagsMode::None,
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self, TagsMode::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("json"), Some(Format::Json));
        assert_eq!(Format::from_extension("js"), Some(Format::Compact));
        assert_eq!(Format::from_extension("xml"), Some(Format::Xml));
        assert_eq!(Format::from_extension("txt"), Some(Format::Text));
        assert_eq!(Format::from_extension("html"), None);
        assert_eq!(Format::from_extension("JSON"), None);
    }

    #[test]
    fn test_renderer_matches_format() {
        for format in [Format::Json, Format::Compact, Format::Xml, Format::Text] {
            assert_eq!(format.renderer().format(), format);
            assert_eq!(Format::from_extension(&format.to_string()), Some(format));
        }
    }

    #[test]
    fn test_tags_mode_from_param() {
        assert_eq!(TagsMode::from_param(None), TagsMode::None);
        assert_eq!(TagsMode::from_param(Some("yes")), TagsMode::Matched);
        assert_eq!(TagsMode::from_param(Some("True")), TagsMode::Matched);
        assert_eq!(TagsMode::from_param(Some("all")), TagsMode::All);
        assert_eq!(TagsMode::from_param(Some("no")), TagsMode::None);
        assert!(!TagsMode::from_param(Some("")).is_requested());
    }
}
