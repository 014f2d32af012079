//! Element Attributes
//!
//! Ordered attribute map, attribute values and the attribute merge algorithm.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::classlist::merge_classes;

/// Attribute value
///
/// `Null` keeps the key in the map but omits it from the rendered tag,
/// which lets an override mask an inherited attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Class token list
    List(Vec<String>),
    /// Structured value, JSON-encoded when emitted on `data-*` attributes
    Json(Value),
}

impl AttrValue {
    /// Convert a JSON value into an attribute value
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) if items.iter().all(Value::is_string) => Self::List(
                items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
            ),
            other => Self::Json(other.clone()),
        }
    }

    /// Convert back into a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(items) => Value::from(items.clone()),
            Self::Json(v) => v.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String, number or boolean
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Str(_) | Self::Int(_) | Self::Float(_) | Self::Bool(_))
    }

    /// Plain-text form used when the value is written into a tag.
    /// `None` for `Null`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(true) => Some("1".to_string()),
            Self::Bool(false) => Some(String::new()),
            Self::List(items) => Some(items.join(" ")),
            Self::Json(Value::String(s)) => Some(s.clone()),
            Self::Json(v) => Some(v.to_string()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text().unwrap_or_default())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered attribute collection
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: Vec<(String, AttrValue)>,
    by_name: HashMap<String, usize>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding only a `class` entry
    pub fn with_class(classes: &str) -> Self {
        let mut map = Self::new();
        map.set("class", classes);
        map
    }

    /// Build from a JSON object. A bare string is read as a class list,
    /// anything else yields an empty map.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(object) => object
                .iter()
                .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
                .collect(),
            Value::String(classes) => Self::with_class(classes),
            _ => Self::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Get number of attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get attribute by name
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.by_name.get(name).map(|&i| &self.entries[i].1)
    }

    /// Set attribute, keeping the position of an existing entry
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Option<AttrValue> {
        let value = value.into();
        if let Some(&index) = self.by_name.get(name) {
            Some(std::mem::replace(&mut self.entries[index].1, value))
        } else {
            let index = self.entries.len();
            self.by_name.insert(name.to_string(), index);
            self.entries.push((name.to_string(), value));
            None
        }
    }

    /// Remove attribute by name
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.by_name.remove(name)?;
        // Update indices for items after removed
        for idx in self.by_name.values_mut() {
            if *idx > index {
                *idx -= 1;
            }
        }
        Some(self.entries.remove(index).1)
    }

    /// Check if attribute exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_name.clear();
    }

    /// Attribute names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over attributes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy with the class list merged into its canonical form
    pub fn normalized(&self) -> Self {
        merge_attributes(self, std::iter::empty::<&AttributeMap>())
    }

    /// Merge `other` into this map (see [`merge_attributes`])
    pub fn merge(&mut self, other: &AttributeMap) {
        *self = merge_attributes(self, [other]);
    }
}

impl PartialEq for AttributeMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            let name: String = k.into();
            map.set(&name, v);
        }
        map
    }
}

/// Class text contributed by one attribute map
fn class_text(attrs: &AttributeMap) -> Option<String> {
    attrs.get("class").and_then(AttrValue::as_text)
}

/// Shallow-merge attribute maps left to right.
///
/// Later values overwrite earlier ones (new keys are appended, existing keys
/// keep their position), except `class`: every map's classes are collected
/// and run through [`merge_classes`], and the entry sits where the first
/// map contributing it placed it. An empty merged class list removes
/// the `class` entry.
pub fn merge_attributes<'a, I>(base: &AttributeMap, overrides: I) -> AttributeMap
where
    I: IntoIterator<Item = &'a AttributeMap>,
{
    let mut result = base.clone();
    let mut classes: Vec<String> = class_text(base).into_iter().collect();

    for attrs in overrides {
        classes.extend(class_text(attrs));
        for (name, value) in attrs.iter() {
            // the first map carrying `class` fixes its position
            if name != "class" || !result.contains("class") {
                result.set(name, value.clone());
            }
        }
    }

    let merged = merge_classes(&classes);
    if merged.is_empty() {
        result.remove("class");
    } else {
        result.set("class", merged);
    }
    result
}
