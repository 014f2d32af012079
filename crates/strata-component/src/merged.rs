//! Merged data
//!
//! Fields whose defaults accumulate along the type chain instead of being
//! replaced: the attribute map, the binding table and any other declared
//! merged names (shallow map merge).

use serde_json::Value;
use strata_dom::AttributeMap;

use crate::definition::{ATTRIBUTES, ATTRIBUTE_BINDINGS};
use crate::{BindingTable, DataMap};

/// A normalized merged value
#[derive(Debug, Clone, PartialEq)]
pub enum MergedValue {
    Attributes(AttributeMap),
    Bindings(BindingTable),
    Map(DataMap),
}

impl MergedValue {
    /// Normalize a declared or caller-supplied value for field `name`
    pub fn normalize(name: &str, value: &Value) -> Self {
        match name {
            ATTRIBUTES => Self::Attributes(AttributeMap::from_json(value)),
            ATTRIBUTE_BINDINGS => Self::Bindings(BindingTable::from_json(value)),
            _ => Self::Map(match value {
                Value::Object(map) => map.clone(),
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.clone()))
                    .collect(),
                _ => DataMap::new(),
            }),
        }
    }

    /// Merge `other` into this value. Mismatched kinds replace.
    pub fn merge(&mut self, other: MergedValue) {
        match (self, other) {
            (Self::Attributes(base), Self::Attributes(extra)) => base.merge(&extra),
            (Self::Bindings(base), Self::Bindings(extra)) => base.extend(&extra),
            (Self::Map(base), Self::Map(extra)) => base.extend(extra),
            (this, other) => *this = other,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Attributes(attributes) => attributes.to_json(),
            Self::Bindings(bindings) => bindings.to_json(),
            Self::Map(map) => Value::Object(map.clone()),
        }
    }
}

/// Resolved merged data of one type, in introduction order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedData {
    values: Vec<(String, MergedValue)>,
}

impl MergedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MergedValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MergedValue> {
        self.values.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add a newly introduced name; existing names are left alone
    pub fn introduce(&mut self, name: &str, value: MergedValue) {
        if !self.contains(name) {
            self.values.push((name.to_string(), value));
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MergedValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut MergedValue)> {
        self.values.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    /// Resolved default attributes (empty when not introduced)
    pub fn attributes(&self) -> AttributeMap {
        match self.get(ATTRIBUTES) {
            Some(MergedValue::Attributes(attributes)) => attributes.clone(),
            _ => AttributeMap::new(),
        }
    }

    /// Resolved default bindings (empty when not introduced)
    pub fn bindings(&self) -> BindingTable {
        match self.get(ATTRIBUTE_BINDINGS) {
            Some(MergedValue::Bindings(bindings)) => bindings.clone(),
            _ => BindingTable::new(),
        }
    }
}

/// Declared defaults that carry nothing to merge
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_dom::AttrValue;

    #[test]
    fn test_attributes_merge_classes() {
        let mut value = MergedValue::normalize(ATTRIBUTES, &json!({"class": "component", "id": "a"}));
        value.merge(MergedValue::normalize(ATTRIBUTES, &json!({"class": "extra", "id": "b"})));
        let MergedValue::Attributes(attributes) = value else {
            panic!("expected attributes");
        };
        assert_eq!(attributes.get("class"), Some(&AttrValue::from("component extra")));
        assert_eq!(attributes.get("id"), Some(&AttrValue::from("b")));
    }

    #[test]
    fn test_plain_maps_merge_shallow() {
        let mut value = MergedValue::normalize("options", &json!({"a": 1, "b": {"x": 1}}));
        value.merge(MergedValue::normalize("options", &json!({"b": {"y": 2}})));
        assert_eq!(value.to_json(), json!({"a": 1, "b": {"y": 2}}));
    }

    #[test]
    fn test_introduce_keeps_existing() {
        let mut data = MergedData::new();
        data.introduce("options", MergedValue::normalize("options", &json!({"a": 1})));
        data.introduce("options", MergedValue::normalize("options", &json!({"a": 2})));
        assert_eq!(data.get("options").map(MergedValue::to_json), Some(json!({"a": 1})));
        assert!(data.attributes().is_empty());
    }
}
