//! Virtual DOM Nodes
//!
//! Text (escaped), raw source (trusted markup) and element nodes.

use std::fmt;

use crate::element::Element;
use crate::escape::{encode_entities, EntityMode};

/// Virtual DOM node
///
/// A parent element owns its children; nodes are never shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(Text),
    Raw(RawSource),
    Element(Element),
}

impl Node {
    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Check if this is raw markup
    #[inline]
    pub fn is_raw(&self) -> bool {
        matches!(self, Node::Raw(_))
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Get element if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text node if this is one
    #[inline]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(t) => t.fmt(f),
            Node::Raw(r) => r.fmt(f),
            Node::Element(e) => e.fmt(f),
        }
    }
}

impl From<Text> for Node {
    fn from(t: Text) -> Self {
        Node::Text(t)
    }
}

impl From<RawSource> for Node {
    fn from(r: RawSource) -> Self {
        Node::Raw(r)
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

/// Text node, entity-encoded when stringified
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub content: String,
    /// Entity mode override (element default when `None`)
    pub entity_mode: Option<EntityMode>,
    /// Charset label override
    pub charset: Option<String>,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            entity_mode: None,
            charset: None,
        }
    }

    pub fn with_mode(content: impl Into<String>, mode: EntityMode) -> Self {
        Self {
            content: content.into(),
            entity_mode: Some(mode),
            charset: None,
        }
    }

    pub fn append(&mut self, text: &str) -> &mut Self {
        self.content.push_str(text);
        self
    }

    pub fn prepend(&mut self, text: &str) -> &mut Self {
        self.content.insert_str(0, text);
        self
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = self.entity_mode.unwrap_or_default();
        f.write_str(&encode_entities(&self.content, mode))
    }
}

/// Raw markup, written out untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSource {
    pub content: String,
}

impl RawSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    pub fn append_html(&mut self, html: &str) -> &mut Self {
        self.content.push_str(html);
        self
    }

    pub fn prepend_html(&mut self, html: &str) -> &mut Self {
        self.content.insert_str(0, html);
        self
    }

    /// Append text, entity-encoded
    pub fn append_text(&mut self, text: &str, mode: Option<EntityMode>) -> &mut Self {
        let encoded = encode_entities(text, mode.unwrap_or_default());
        self.content.push_str(&encoded);
        self
    }

    /// Prepend text, entity-encoded
    pub fn prepend_text(&mut self, text: &str, mode: Option<EntityMode>) -> &mut Self {
        let encoded = encode_entities(text, mode.unwrap_or_default());
        self.content.insert_str(0, &encoded);
        self
    }
}

impl fmt::Display for RawSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
