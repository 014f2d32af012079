//! Strata DOM - Virtual node tree
//!
//! Owned, string-rendered node tree: escaped text, raw markup and elements
//! with ordered attributes. Every render builds a fresh string; there is no
//! diffing against a previous tree.

mod attributes;
mod classlist;
mod config;
mod element;
mod escape;
mod node;

pub use attributes::{merge_attributes, AttrValue, AttributeMap};
pub use classlist::{merge_classes, ClassList};
pub use config::{DomConfig, DEFAULT_LONELY_TAGS};
pub use element::{Content, Element, DEFAULT_TAG};
pub use escape::{css_escape, encode_entities, Encoding, EntityMode, DEFAULT_CHARSET};
pub use node::{Node, RawSource, Text};
