//! DOM Configuration

use crate::escape::Encoding;

/// Tags created without a body or closing tag by default
pub const DEFAULT_LONELY_TAGS: &[&str] = &["img", "hr", "link"];

/// Settings used when building elements
#[derive(Debug, Clone)]
pub struct DomConfig {
    /// Tags that get `children == None` when created without content
    pub lonely_tags: Vec<String>,

    /// Encoding for attribute values
    pub encoding: Encoding,

    /// Decides whether a bare string passed as element content is markup.
    /// Strings are treated as text when unset.
    pub string_is_html: Option<fn(&str) -> bool>,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            lonely_tags: DEFAULT_LONELY_TAGS.iter().map(|t| t.to_string()).collect(),
            encoding: Encoding::default(),
            string_is_html: None,
        }
    }
}

impl DomConfig {
    /// Whether `tag` is a lonely (void) tag
    pub fn is_lonely(&self, tag: &str) -> bool {
        self.lonely_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub(crate) fn string_is_html(&self, s: &str) -> bool {
        self.string_is_html.is_some_and(|f| f(s))
    }
}
