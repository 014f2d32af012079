//! Class Lists
//!
//! Space-separated class tokens and the class merge algorithm.

use std::fmt;

/// Merge class groups into one space-separated list.
///
/// Every group is split on spaces and the tokens are processed in order:
/// - empty tokens are dropped
/// - `!name` removes any earlier `name` and is never emitted itself
/// - a repeated token keeps a single entry, placed at its last occurrence
///
/// ```
/// use strata_dom::merge_classes;
///
/// assert_eq!(merge_classes(["a b", "!a c"]), "b c");
/// assert_eq!(merge_classes(["a b", "a"]), "b a");
/// ```
pub fn merge_classes<I, S>(groups: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let groups: Vec<S> = groups.into_iter().collect();
    // (token, index of last occurrence)
    let mut seen: Vec<(&str, usize)> = Vec::new();

    let tokens = groups.iter().flat_map(|g| g.as_ref().split(' '));
    for (index, token) in tokens.enumerate() {
        if token.is_empty() {
            continue;
        }
        if let Some(negated) = token.strip_prefix('!') {
            seen.retain(|(t, _)| *t != negated);
            continue;
        }
        match seen.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = index,
            None => seen.push((token, index)),
        }
    }

    seen.sort_by_key(|&(_, index)| index);
    seen.iter().map(|(t, _)| *t).collect::<Vec<_>>().join(" ")
}

/// Ordered list of class tokens (an element's `class` attribute)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    /// Create empty class list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let tokens = s.split_whitespace().map(|s| s.to_string()).collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Merge more classes in, following [`merge_classes`] rules
    pub fn add(&mut self, classes: &str) {
        let merged = merge_classes([self.value().as_str(), classes]);
        *self = Self::from_string(&merged);
    }

    /// Remove the first occurrence of each given token
    pub fn remove<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) {
        let mut unique: Vec<&str> = Vec::new();
        for token in tokens {
            if !unique.contains(&token) {
                unique.push(token);
            }
        }
        for token in unique {
            if let Some(pos) = self.tokens.iter().position(|t| t == token) {
                self.tokens.remove(pos);
            }
        }
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl From<&str> for ClassList {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negated_class_removes_earlier() {
        assert_eq!(merge_classes(["a b", "!a c"]), "b c");
    }

    #[test]
    fn test_repeated_class_collapses() {
        assert_eq!(merge_classes(["a b", "b"]), "a b");
        assert_eq!(merge_classes(["a b c", "a"]), "b c a");
    }

    #[test]
    fn test_empty_tokens_dropped() {
        assert_eq!(merge_classes(["  a  ", "", "b "]), "a b");
        assert_eq!(merge_classes(Vec::<String>::new()), "");
    }

    #[test]
    fn test_negation_then_readd() {
        assert_eq!(merge_classes(["a", "!a", "a"]), "a");
        assert_eq!(merge_classes(["!a b"]), "b");
    }

    #[test]
    fn test_class_list_add_remove() {
        let mut list = ClassList::from_string("btn active");
        list.add("primary !active");
        assert_eq!(list.value(), "btn primary");

        list.remove(["btn", "btn"]);
        assert_eq!(list.value(), "primary");
        assert!(!list.contains("btn"));
    }
}
