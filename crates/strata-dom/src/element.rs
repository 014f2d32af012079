//! Elements
//!
//! Tag + ordered attributes + owned children. `children == None` marks a
//! lonely tag (no body, no closing tag); `Some(vec![])` is an element whose
//! content was explicitly emptied.

use std::fmt;

use crate::attributes::{merge_attributes, AttrValue, AttributeMap};
use crate::classlist::{merge_classes, ClassList};
use crate::config::DomConfig;
use crate::escape::Encoding;
use crate::node::{Node, RawSource, Text};

/// Tag used when none is given
pub const DEFAULT_TAG: &str = "div";

/// Content handed to the element content setters
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Node(Node),
    Str(String),
    Many(Vec<Content>),
}

impl From<Node> for Content {
    fn from(n: Node) -> Self {
        Content::Node(n)
    }
}

impl From<Text> for Content {
    fn from(t: Text) -> Self {
        Content::Node(Node::Text(t))
    }
}

impl From<RawSource> for Content {
    fn from(r: RawSource) -> Self {
        Content::Node(Node::Raw(r))
    }
}

impl From<Element> for Content {
    fn from(e: Element) -> Self {
        Content::Node(Node::Element(e))
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Str(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Str(s)
    }
}

impl<T: Into<Content>> From<Vec<T>> for Content {
    fn from(items: Vec<T>) -> Self {
        Content::Many(items.into_iter().map(Into::into).collect())
    }
}

/// Flattened content item
enum Item {
    Node(Node),
    Str(String),
}

impl Content {
    fn flatten_into(self, out: &mut Vec<Item>) {
        match self {
            Content::Many(items) => items.into_iter().for_each(|c| c.flatten_into(out)),
            Content::Str(s) if s.is_empty() => {}
            Content::Str(s) => out.push(Item::Str(s)),
            Content::Node(n) => out.push(Item::Node(n)),
        }
    }

    fn flatten(self) -> Vec<Item> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    /// Convert to nodes. Strings become raw markup when `text_is_html` says
    /// so, or when it is `None` and the configured predicate accepts them.
    fn into_nodes(self, text_is_html: Option<bool>, config: &DomConfig) -> Vec<Node> {
        self.flatten()
            .into_iter()
            .map(|item| match item {
                Item::Node(node) => node,
                Item::Str(s) => {
                    let is_html = text_is_html.unwrap_or_else(|| config.string_is_html(&s));
                    if is_html {
                        Node::Raw(RawSource::new(s))
                    } else {
                        Node::Text(Text::new(s))
                    }
                }
            })
            .collect()
    }

    /// Convert to text nodes; non-text nodes are stringified and escaped
    fn into_text_nodes(self) -> Vec<Node> {
        self.flatten()
            .into_iter()
            .map(|item| match item {
                Item::Node(Node::Text(t)) => Node::Text(t),
                Item::Node(other) => Node::Text(Text::new(other.to_string())),
                Item::Str(s) => Node::Text(Text::new(s)),
            })
            .collect()
    }
}

/// HTML element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attributes: AttributeMap,
    children: Option<Vec<Node>>,
    encoding: Encoding,
}

impl Default for Element {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl Element {
    /// Create an element with default settings. Lonely tags get no children.
    pub fn new(tag: &str) -> Self {
        Self::new_in(&DomConfig::default(), tag)
    }

    /// Create an element using `config`
    pub fn new_in(config: &DomConfig, tag: &str) -> Self {
        let tag = if tag.is_empty() { DEFAULT_TAG } else { tag };
        Self {
            tag: tag.to_string(),
            attributes: AttributeMap::new(),
            children: if config.is_lonely(tag) { None } else { Some(Vec::new()) },
            encoding: config.encoding.clone(),
        }
    }

    /// Create an element with attributes
    pub fn with_attributes(tag: &str, attributes: &AttributeMap) -> Self {
        let mut element = Self::new(tag);
        element.attributes = attributes.normalized();
        element
    }

    /// Create an element with explicit content. `None` content makes the
    /// element lonely whatever its tag.
    pub fn with_content(
        config: &DomConfig,
        tag: &str,
        attributes: Option<&AttributeMap>,
        content: Option<Content>,
    ) -> Self {
        let mut element = Self::new_in(config, tag);
        if let Some(attributes) = attributes {
            element.attributes = attributes.normalized();
        }
        element.children = content.map(|c| c.into_nodes(None, config));
        element
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.encoding = encoding;
        self
    }

    /// Whether this element has no body and no closing tag
    pub fn is_lonely(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<&[Node]> {
        self.children.as_deref()
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.children.as_mut()
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    /// Get attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Set attribute; a `Null` value removes it
    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttrValue>) -> &mut Self {
        let value = value.into();
        if value.is_null() {
            self.attributes.remove(name);
        } else {
            self.attributes.set(name, value);
        }
        self
    }

    /// Merge a whole attribute map in (classes are merged, not replaced)
    pub fn set_attributes(&mut self, attributes: &AttributeMap) -> &mut Self {
        self.attributes.merge(attributes);
        self
    }

    pub fn unset_attribute(&mut self, name: &str) -> &mut Self {
        self.attributes.remove(name);
        self
    }

    pub fn clear_attributes(&mut self) -> &mut Self {
        self.attributes.clear();
        self
    }

    /// Add classes following the class merge rules
    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        let current = self.class_text();
        let merged = merge_classes([current.as_str(), classes]);
        self.set_attribute("class", merged)
    }

    /// Remove the first occurrence of each given class
    pub fn remove_class(&mut self, classes: &str) -> &mut Self {
        if self.attributes.contains("class") {
            let mut list = ClassList::from_string(&self.class_text());
            list.remove(classes.split(' ').filter(|c| !c.is_empty()));
            let tokens: Vec<String> = list.iter().map(str::to_string).collect();
            if tokens.is_empty() {
                self.attributes.remove("class");
            } else {
                self.attributes.set("class", tokens);
            }
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_text().split(' ').any(|c| c == class)
    }

    fn class_text(&self) -> String {
        self.attributes
            .get("class")
            .and_then(AttrValue::as_text)
            .unwrap_or_default()
    }

    // ========================================================================
    // Content
    // ========================================================================

    /// Replace content; bare strings are taken as markup
    pub fn set_html_content(&mut self, content: impl Into<Content>) -> &mut Self {
        let nodes = content.into().into_nodes(Some(true), &DomConfig::default());
        self.children = Some(nodes);
        self
    }

    /// Replace content with a single text node
    pub fn set_text_content(&mut self, text: &str) -> &mut Self {
        self.children = Some(vec![Node::Text(Text::new(text))]);
        self
    }

    pub fn append_html(&mut self, content: impl Into<Content>) -> &mut Self {
        let nodes = content.into().into_nodes(Some(true), &DomConfig::default());
        self.children.get_or_insert_with(Vec::new).extend(nodes);
        self
    }

    pub fn prepend_html(&mut self, content: impl Into<Content>) -> &mut Self {
        let nodes = content.into().into_nodes(Some(true), &DomConfig::default());
        self.prepend_nodes(nodes)
    }

    pub fn append_text(&mut self, content: impl Into<Content>) -> &mut Self {
        let nodes = content.into().into_text_nodes();
        self.children.get_or_insert_with(Vec::new).extend(nodes);
        self
    }

    pub fn prepend_text(&mut self, content: impl Into<Content>) -> &mut Self {
        let nodes = content.into().into_text_nodes();
        self.prepend_nodes(nodes)
    }

    /// Append an owned child node
    pub fn append_child(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.get_or_insert_with(Vec::new).push(node.into());
        self
    }

    fn prepend_nodes(&mut self, mut nodes: Vec<Node>) -> &mut Self {
        if let Some(existing) = self.children.take() {
            nodes.extend(existing);
        }
        self.children = Some(nodes);
        self
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Opening tag with `extra` merged over the element's attributes
    pub fn open_tag(&self, extra: Option<&AttributeMap>) -> String {
        let attributes = merge_attributes(&self.attributes, extra);
        let mut out = format!("<{}", self.tag);
        for (name, value) in attributes.iter() {
            let text = if name.starts_with("data-")
                && (!value.is_scalar() || matches!(value, AttrValue::Bool(_)))
            {
                if value.is_null() {
                    continue;
                }
                value.to_json().to_string()
            } else {
                match value.as_text() {
                    Some(text) => text,
                    None => continue,
                }
            };
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&self.encoding.encode(&text));
            out.push('"');
        }
        out.push('>');
        out
    }

    pub fn close_tag(&self) -> String {
        format!("</{}>", self.tag)
    }

    /// Concatenated children, or `None` for a lonely element
    pub fn html_content(&self) -> Option<String> {
        self.children
            .as_ref()
            .map(|children| children.iter().map(Node::to_string).collect())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.open_tag(None))?;
        if let Some(html) = self.html_content() {
            f.write_str(&html)?;
            f.write_str(&self.close_tag())?;
        }
        Ok(())
    }
}
