//! Query strings
//!
//! Flat, order-preserving `key=value` pairs. Nested input values are written
//! with bracket keys (`tags[0]=a&tags[1]=b`, `filter[kind]=x`) and read back
//! into arrays and objects.

use std::fmt;

use serde_json::{Map, Value};

use crate::DataMap;

/// Query parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse query string (without leading ?)
    pub fn parse(s: &str) -> Self {
        let params = s
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(k), percent_decode(v))
            })
            .collect();
        Self { params }
    }

    /// Flatten an input map. `null` values are skipped, booleans become
    /// `1`/`0`.
    pub fn from_input(input: &DataMap) -> Self {
        let mut query = Self::new();
        for (key, value) in input {
            query.push_value(key.clone(), value);
        }
        query
    }

    fn push_value(&mut self, key: String, value: &Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => self.append(&key, if *b { "1" } else { "0" }),
            Value::Number(n) => self.append(&key, &n.to_string()),
            Value::String(s) => self.append(&key, s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.push_value(format!("{}[{}]", key, i), item);
                }
            }
            Value::Object(map) => {
                for (k, item) in map {
                    self.push_value(format!("{}[{}]", key, k), item);
                }
            }
        }
    }

    /// Rebuild an input map. Bracket keys become arrays when their indices
    /// run `0..n`, objects otherwise. Repeated plain keys keep the last value.
    pub fn to_input(&self) -> DataMap {
        let mut root = Map::new();
        for (key, value) in &self.params {
            let path = split_key(key);
            insert_path(&mut root, &path, Value::String(value.clone()));
        }
        root.into_iter().map(|(k, v)| (k, arrayify(v))).collect()
    }

    /// Get first value for key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Get all values for key
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Append a value
    pub fn append(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Check if key exists
    pub fn has(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Iterate over entries
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for Query {
    /// Serialize to query string (without leading ?)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", percent_encode(k), percent_encode(v))?;
        }
        Ok(())
    }
}

/// `a[b][]` -> `["a", "b", ""]`. Malformed brackets keep the raw key.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key.to_string()];
    }

    let mut path = vec![key[..open].to_string()];
    for segment in key[open + 1..key.len() - 1].split("][") {
        if segment.contains('[') || segment.contains(']') {
            return vec![key.to_string()];
        }
        path.push(segment.to_string());
    }
    path
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let head = if head.is_empty() {
        map.len().to_string()
    } else {
        head.clone()
    };

    if rest.is_empty() {
        map.insert(head, value);
        return;
    }
    let slot = map
        .entry(head)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(child) = slot {
        insert_path(child, rest, value);
    }
}

/// Objects keyed only by numeric indices become arrays, ordered by index
fn arrayify(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let indexed: Option<Vec<(usize, Value)>> = map
                .iter()
                .map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v.clone())))
                .collect();
            match indexed.filter(|items| !items.is_empty()) {
                Some(mut items) => {
                    items.sort_by_key(|(i, _)| *i);
                    Value::Array(items.into_iter().map(|(_, v)| arrayify(v)).collect())
                }
                None => Value::Object(map.into_iter().map(|(k, v)| (k, arrayify(v))).collect()),
            }
        }
        other => other,
    }
}

// ============================================================================
// Percent Encoding (RFC 3986)
// ============================================================================

/// Percent-decode a string. `+` decodes to a space; invalid escapes are
/// kept as-is and the result is read as UTF-8.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode a string (for query parameters)
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);

    for c in s.chars() {
        match c {
            // Unreserved characters (RFC 3986)
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => {
                result.push(c);
            }
            ' ' => {
                result.push('+');
            }
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }

    result
}
