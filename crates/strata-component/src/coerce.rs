//! Loose value coercion
//!
//! Conversions shared by input parsing and attribute bindings. They accept
//! whatever arrived from a query string or a data map and never fail.

use serde_json::Value;

/// Plain-text form of a value. `Null` is empty, `true` is `"1"`.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness: `""`, `"0"`, `0`, `false`, `null` and empty collections are false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Integer value. Strings are read up to the first non-digit.
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let digits = numeric_prefix(s, false);
            digits.parse::<i64>().unwrap_or(0)
        }
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

/// Float value. Strings are read up to the end of their numeric prefix.
pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => numeric_prefix(s, true).parse::<f64>().unwrap_or(0.0),
        other => to_int(other) as f64,
    }
}

/// Leading `[sign]digits[.digits][e[sign]digits]` of `s`, whitespace trimmed
fn numeric_prefix(s: &str, fractional: bool) -> &str {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if !fractional {
        return &s[..end];
    }

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 || end > digits_start {
            end = frac;
        }
    }
    if end > digits_start && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!(null)), "");
        assert_eq!(stringify(&json!(true)), "1");
        assert_eq!(stringify(&json!(false)), "");
        assert_eq!(stringify(&json!(12)), "12");
        assert_eq!(stringify(&json!("x")), "x");
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!("0")));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!("false")));
        assert!(truthy(&json!([1])));
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(&json!("42abc")), 42);
        assert_eq!(to_int(&json!("  -7")), -7);
        assert_eq!(to_int(&json!("abc")), 0);
        assert_eq!(to_int(&json!(3.9)), 3);
        assert_eq!(to_int(&json!(true)), 1);
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float(&json!("1.5kg")), 1.5);
        assert_eq!(to_float(&json!("2e3")), 2000.0);
        assert_eq!(to_float(&json!(".5")), 0.5);
        assert_eq!(to_float(&json!("x")), 0.0);
        assert_eq!(to_float(&json!(4)), 4.0);
    }
}
