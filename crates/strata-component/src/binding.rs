//! Attribute bindings
//!
//! A binding maps an attribute name to a component property, with an
//! optional coercion applied when the open tag is built.

use serde_json::{Map, Value};
use strata_dom::{AttrValue, AttributeMap};

use crate::coerce::{stringify, to_float, to_int};
use crate::ComponentError;

/// How a bound value is coerced
#[derive(Debug, Clone, PartialEq)]
pub enum BindingType {
    /// Value is used as-is
    Passthrough,
    /// Named scalar coercion (`string`, `int`, `float`)
    Named(String),
    /// Object whose keys are bound recursively
    Composite(BindingTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub source: String,
    pub ty: BindingType,
}

impl Binding {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ty: BindingType::Passthrough,
        }
    }

    pub fn typed(source: impl Into<String>, ty: &str) -> Self {
        Self {
            source: source.into(),
            ty: BindingType::Named(ty.to_string()),
        }
    }

    /// Normalize one declared entry. `key` is the default source.
    fn from_json(key: &str, value: &Value) -> Self {
        match value {
            Value::String(source) => Self::new(source.as_str()),
            Value::Object(fields) => {
                let source = fields
                    .get("source")
                    .and_then(Value::as_str)
                    .unwrap_or(key)
                    .to_string();
                let ty = match fields.get("type") {
                    Some(Value::String(name)) => BindingType::Named(name.clone()),
                    Some(nested @ Value::Object(_)) => {
                        BindingType::Composite(BindingTable::from_json(nested))
                    }
                    _ => BindingType::Passthrough,
                };
                Self { source, ty }
            }
            _ => Self::new(key),
        }
    }

    fn to_json(&self) -> Value {
        let ty = match &self.ty {
            BindingType::Passthrough => Value::Null,
            BindingType::Named(name) => Value::String(name.clone()),
            BindingType::Composite(table) => table.to_json(),
        };
        let mut fields = Map::new();
        fields.insert("source".to_string(), Value::String(self.source.clone()));
        fields.insert("type".to_string(), ty);
        Value::Object(fields)
    }
}

/// Ordered binding table, keyed by attribute name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    entries: Vec<(String, Binding)>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a declared table.
    ///
    /// Accepts a list of bare names, a single name, or an object whose values
    /// are a source name, `null`, or `{source?, type?}` where `type` may be a
    /// nested table.
    pub fn from_json(value: &Value) -> Self {
        let mut table = Self::new();
        match value {
            Value::Array(names) => {
                for name in names.iter().filter_map(Value::as_str) {
                    table.set(name, Binding::new(name));
                }
            }
            Value::String(name) => table.set(name, Binding::new(name.as_str())),
            Value::Object(entries) => {
                for (key, value) in entries {
                    table.set(key, Binding::from_json(key, value));
                }
            }
            _ => {}
        }
        table
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, b)| (k.clone(), b.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, b)| b)
    }

    /// Insert or replace, keeping the position of an existing entry
    pub fn set(&mut self, name: &str, binding: Binding) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = binding,
            None => self.entries.push((name.to_string(), binding)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Shallow merge: entries of `other` overwrite same-named ones
    pub fn extend(&mut self, other: &BindingTable) {
        for (name, binding) in &other.entries {
            self.set(name, binding.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(k, b)| (k.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every binding through `lookup` and coerce the values
    pub fn serialize<F>(&self, lookup: F) -> Result<AttributeMap, ComponentError>
    where
        F: Fn(&str) -> Option<Value>,
    {
        let mut attributes = AttributeMap::new();
        for (name, binding) in &self.entries {
            let value = lookup(&binding.source).unwrap_or(Value::Null);
            let value = coerce(name, value, &binding.ty)?;
            attributes.set(name, AttrValue::from_json(&value));
        }
        Ok(attributes)
    }
}

/// Coerce a bound value. Missing values stay `null` whatever the type.
fn coerce(attribute: &str, value: Value, ty: &BindingType) -> Result<Value, ComponentError> {
    match ty {
        BindingType::Passthrough => Ok(value),
        BindingType::Composite(table) => {
            let object = match value {
                Value::Object(object) => object,
                _ => Map::new(),
            };
            let mut out = Map::new();
            for (key, binding) in &table.entries {
                let nested = object.get(&binding.source).cloned().unwrap_or(Value::Null);
                out.insert(key.clone(), coerce(key, nested, &binding.ty)?);
            }
            Ok(Value::Object(out))
        }
        BindingType::Named(name) => {
            if !matches!(name.as_str(), "string" | "int" | "float") {
                return Err(ComponentError::InvalidAttributeType {
                    attribute: attribute.to_string(),
                    ty: name.clone(),
                });
            }
            if value.is_null() {
                return Ok(value);
            }
            Ok(match name.as_str() {
                "string" => Value::String(stringify(&value)),
                "int" => Value::from(to_int(&value)),
                _ => Value::from(to_float(&value)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_forms() {
        let table = BindingTable::from_json(&json!({
            "title": "label",
            "data-id": null,
            "data-count": {"type": "int"},
            "data-src": {"source": "url"}
        }));
        assert_eq!(table.get("title"), Some(&Binding::new("label")));
        assert_eq!(table.get("data-id"), Some(&Binding::new("data-id")));
        assert_eq!(table.get("data-count"), Some(&Binding::typed("data-count", "int")));
        assert_eq!(table.get("data-src"), Some(&Binding::new("url")));
    }

    #[test]
    fn test_normalize_bare_names() {
        let table = BindingTable::from_json(&json!(["title", "lang"]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("lang"), Some(&Binding::new("lang")));
    }

    #[test]
    fn test_normalize_nested_type() {
        let table = BindingTable::from_json(&json!({
            "data-options": {"source": "options", "type": {"size": {"type": "int"}, "label": "name"}}
        }));
        let Some(Binding { ty: BindingType::Composite(nested), .. }) = table.get("data-options") else {
            panic!("expected composite binding");
        };
        assert_eq!(nested.get("size"), Some(&Binding::typed("size", "int")));
        assert_eq!(nested.get("label"), Some(&Binding::new("name")));
    }

    #[test]
    fn test_extend_overwrites_by_name() {
        let mut base = BindingTable::from_json(&json!({"title": "a", "lang": null}));
        base.extend(&BindingTable::from_json(&json!({"title": "b"})));
        assert_eq!(base.get("title"), Some(&Binding::new("b")));
        assert_eq!(base.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["title", "lang"]);
    }

    #[test]
    fn test_serialize_coerces() {
        let table = BindingTable::from_json(&json!({
            "data-count": {"source": "count", "type": "int"},
            "data-ratio": {"source": "ratio", "type": "float"},
            "title": {"source": "count", "type": "string"},
            "data-missing": {"type": "int"},
            "data-options": {"source": "options", "type": {"size": {"type": "int"}}}
        }));
        let data = json!({"count": "12px", "ratio": "0.5", "options": {"size": "3"}});
        let attrs = table.serialize(|name| data.get(name).cloned()).unwrap();

        assert_eq!(attrs.get("data-count"), Some(&AttrValue::Int(12)));
        assert_eq!(attrs.get("data-ratio"), Some(&AttrValue::Float(0.5)));
        assert_eq!(attrs.get("title"), Some(&AttrValue::from("12px")));
        assert_eq!(attrs.get("data-missing"), Some(&AttrValue::Null));
        assert_eq!(
            attrs.get("data-options"),
            Some(&AttrValue::Json(json!({"size": 3})))
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        let table = BindingTable::from_json(&json!({"title": {"type": "date"}}));
        let err = table.serialize(|_| Some(json!("x"))).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidAttributeType { ref ty, .. } if ty == "date"));
    }
}
