//! HTML Entity Encoding
//!
//! `htmlentities`-style encoding used by text nodes and attribute values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which quote characters get encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityMode {
    /// Encode `"` but leave `'` alone
    #[default]
    Compat,
    /// Encode both `"` and `'`
    Quotes,
    /// Leave both quote characters alone
    NoQuotes,
}

impl FromStr for EntityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compat" => Ok(Self::Compat),
            "quotes" => Ok(Self::Quotes),
            "noquotes" | "no_quotes" => Ok(Self::NoQuotes),
            other => Err(format!("unknown entity mode: {}", other)),
        }
    }
}

impl fmt::Display for EntityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compat => write!(f, "compat"),
            Self::Quotes => write!(f, "quotes"),
            Self::NoQuotes => write!(f, "noquotes"),
        }
    }
}

/// Entity mode plus the charset label the output is declared with.
///
/// Rust strings are always UTF-8, so the charset is informational: it is
/// carried along so hosts can emit matching `<meta charset>` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    pub mode: EntityMode,
    pub charset: String,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            mode: EntityMode::Compat,
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl Encoding {
    pub fn new(mode: EntityMode, charset: impl Into<String>) -> Self {
        Self { mode, charset: charset.into() }
    }

    /// Encode `text` with this encoding's entity mode
    pub fn encode(&self, text: &str) -> String {
        encode_entities(text, self.mode)
    }
}

/// Charset used when nothing else is configured
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Named entities for U+00A0..=U+00FF, indexed by `codepoint - 0xA0`
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect",
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr",
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot",
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil",
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml",
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times",
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig",
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml",
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide",
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml",
];

/// Named entity for a character outside the Latin-1 block, if any
fn extended_entity(c: char) -> Option<&'static str> {
    let name = match c {
        '\u{0152}' => "OElig",
        '\u{0153}' => "oelig",
        '\u{0160}' => "Scaron",
        '\u{0161}' => "scaron",
        '\u{0178}' => "Yuml",
        '\u{0192}' => "fnof",
        '\u{02C6}' => "circ",
        '\u{02DC}' => "tilde",
        '\u{2013}' => "ndash",
        '\u{2014}' => "mdash",
        '\u{2018}' => "lsquo",
        '\u{2019}' => "rsquo",
        '\u{201A}' => "sbquo",
        '\u{201C}' => "ldquo",
        '\u{201D}' => "rdquo",
        '\u{201E}' => "bdquo",
        '\u{2020}' => "dagger",
        '\u{2021}' => "Dagger",
        '\u{2022}' => "bull",
        '\u{2026}' => "hellip",
        '\u{2030}' => "permil",
        '\u{2039}' => "lsaquo",
        '\u{203A}' => "rsaquo",
        '\u{20AC}' => "euro",
        '\u{2122}' => "trade",
        _ => return None,
    };
    Some(name)
}

/// Encode every character that has an HTML entity
pub fn encode_entities(text: &str, mode: EntityMode) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);

    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if mode != EntityMode::NoQuotes => out.push_str("&quot;"),
            '\'' if mode == EntityMode::Quotes => out.push_str("&#039;"),
            '\u{A0}'..='\u{FF}' => {
                out.push('&');
                out.push_str(LATIN1_ENTITIES[c as usize - 0xA0]);
                out.push(';');
            }
            _ => match extended_entity(c) {
                Some(name) => {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
                None => out.push(c),
            },
        }
    }

    out
}

/// Backslash-escape the characters that are special inside a CSS selector
pub fn css_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, ':' | '.' | '[' | ']' | ',' | '=' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_specials() {
        assert_eq!(encode_entities("&a>b<c", EntityMode::Compat), "&amp;a&gt;b&lt;c");
        assert_eq!(encode_entities("\"x'", EntityMode::Compat), "&quot;x'");
        assert_eq!(encode_entities("\"x'", EntityMode::Quotes), "&quot;x&#039;");
        assert_eq!(encode_entities("\"x'", EntityMode::NoQuotes), "\"x'");
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(encode_entities("×", EntityMode::Compat), "&times;");
        assert_eq!(encode_entities("café", EntityMode::Compat), "caf&eacute;");
        assert_eq!(encode_entities("\u{a0}€", EntityMode::Compat), "&nbsp;&euro;");
        assert_eq!(encode_entities("日本", EntityMode::Compat), "日本");
    }

    #[test]
    fn test_entity_mode_parse() {
        assert_eq!("QUOTES".parse::<EntityMode>(), Ok(EntityMode::Quotes));
        assert!("html5".parse::<EntityMode>().is_err());
    }

    #[test]
    fn test_css_escape() {
        assert_eq!(css_escape("search.ab12cd"), "search\\.ab12cd");
        assert_eq!(css_escape("a:b[c]=d,e\\"), "a\\:b\\[c\\]\\=d\\,e\\\\");
    }
}
