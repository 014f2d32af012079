//! Input mapping
//!
//! Declarative mapping between flat, externally facing input keys (query
//! parameters) and component data properties.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::coerce::{stringify, to_float, to_int, truthy};

/// Coercion applied to one input value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    Bool,
    Int,
    Float,
    /// `T[]`: comma-joined list of `T`
    List(Box<InputType>),
    /// Any other type name; values pass through untouched
    Other(String),
}

impl FromStr for InputType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(Self::List(Box::new(inner.parse()?)));
        }
        Ok(match s {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::List(inner) => write!(f, "{}[]", inner),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// One declared `input key -> data property` mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub input: String,
    pub name: String,
    pub ty: Option<InputType>,
}

impl InputField {
    pub fn new(input: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            name: name.into(),
            ty: None,
        }
    }

    /// Mapping with a coercion such as `"int"` or `"bool[]"`
    pub fn typed(input: impl Into<String>, name: impl Into<String>, ty: &str) -> Self {
        let ty = match ty.parse::<InputType>() {
            Ok(ty) => ty,
            Err(never) => match never {},
        };
        Self {
            ty: Some(ty),
            ..Self::new(input, name)
        }
    }

    /// Input value -> data value
    pub fn parse(&self, value: &Value) -> Value {
        match &self.ty {
            Some(ty) => parse_value(value, ty),
            None => value.clone(),
        }
    }

    /// Data value -> input value, `None` to omit the key
    pub fn build(&self, value: &Value) -> Option<Value> {
        match &self.ty {
            Some(ty) => build_value(value, ty),
            None => (!value.is_null()).then(|| value.clone()),
        }
    }
}

pub(crate) fn parse_value(value: &Value, ty: &InputType) -> Value {
    match ty {
        InputType::List(inner) => {
            let items: Vec<Value> = match value {
                Value::Array(items) => items.clone(),
                Value::Null => Vec::new(),
                other => stringify(other)
                    .split(',')
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            };
            Value::Array(items.iter().map(|item| parse_value(item, inner)).collect())
        }
        InputType::Bool => Value::Bool(truthy(value)),
        InputType::Int => Value::from(to_int(value)),
        InputType::Float => Value::from(to_float(value)),
        InputType::Other(_) => value.clone(),
    }
}

pub(crate) fn build_value(value: &Value, ty: &InputType) -> Option<Value> {
    match ty {
        InputType::List(inner) => {
            let items = match value {
                Value::Array(items) => items.as_slice(),
                Value::Null => &[],
                other => return build_value(other, inner),
            };
            let joined = items
                .iter()
                .map(|item| build_value(item, inner).map(|v| stringify(&v)).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(",");
            Some(Value::String(joined))
        }
        InputType::Bool => truthy(value).then(|| Value::String("1".to_string())),
        InputType::Int | InputType::Float => {
            (!value.is_null()).then(|| Value::String(stringify(value)))
        }
        InputType::Other(_) => (!value.is_null()).then(|| value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_type_names() {
        assert_eq!("int".parse::<InputType>().unwrap(), InputType::Int);
        assert_eq!(
            "float[]".parse::<InputType>().unwrap(),
            InputType::List(Box::new(InputType::Float))
        );
        assert_eq!("string".parse::<InputType>().unwrap(), InputType::Other("string".into()));
        assert_eq!(InputType::List(Box::new(InputType::Bool)).to_string(), "bool[]");
    }

    #[test]
    fn test_parse_list() {
        let field = InputField::typed("ids", "ids", "int[]");
        assert_eq!(field.parse(&json!("1,2,,3")), json!([1, 2, 3]));
        assert_eq!(field.parse(&json!(["4", "5"])), json!([4, 5]));
        assert_eq!(field.parse(&json!(null)), json!([]));
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(InputField::typed("a", "a", "bool").parse(&json!("0")), json!(false));
        assert_eq!(InputField::typed("a", "a", "bool").parse(&json!("yes")), json!(true));
        assert_eq!(InputField::typed("a", "a", "float").parse(&json!("2.5")), json!(2.5));
        assert_eq!(InputField::new("a", "a").parse(&json!("raw")), json!("raw"));
    }

    #[test]
    fn test_build_values() {
        let flag = InputField::typed("f", "flag", "bool");
        assert_eq!(flag.build(&json!(true)), Some(json!("1")));
        assert_eq!(flag.build(&json!(false)), None);

        let ids = InputField::typed("ids", "ids", "int[]");
        assert_eq!(ids.build(&json!([1, 2])), Some(json!("1,2")));

        let page = InputField::typed("p", "page", "int");
        assert_eq!(page.build(&json!(3)), Some(json!("3")));
        assert_eq!(page.build(&json!(null)), None);
    }
}
