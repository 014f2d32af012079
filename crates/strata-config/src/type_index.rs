//! Type Parent-Chain Index
//!
//! Explicit replacement for walking a live class hierarchy: each type is
//! registered with its parent, and chains are computed once and cached.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::ConfigError;

/// Registered types and their parents
#[derive(Debug, Default)]
pub struct TypeIndex {
    parents: HashMap<String, Option<String>>,
    /// Registration order, for stable iteration
    order: Vec<String>,
    chains: RwLock<HashMap<String, Arc<[String]>>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under `parent`. The parent must already be registered,
    /// which keeps the hierarchy acyclic.
    pub fn register(&mut self, name: &str, parent: Option<&str>) -> Result<(), ConfigError> {
        if self.parents.contains_key(name) {
            return Err(ConfigError::DuplicateType(name.to_string()));
        }
        if let Some(parent) = parent {
            if !self.parents.contains_key(parent) {
                return Err(ConfigError::UnknownParent {
                    name: name.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        self.parents.insert(name.to_string(), parent.map(str::to_string));
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    /// Direct parent of `name`
    pub fn parent(&self, name: &str) -> Option<&str> {
        self.parents.get(name).and_then(|p| p.as_deref())
    }

    /// Registered type names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `name` followed by its ancestors, nearest first
    pub fn chain(&self, name: &str) -> Result<Arc<[String]>, ConfigError> {
        if let Some(chain) = self.chains.read().get(name) {
            return Ok(Arc::clone(chain));
        }
        if !self.contains(name) {
            return Err(ConfigError::UnknownType(name.to_string()));
        }

        let mut chain = vec![name.to_string()];
        let mut current = name;
        while let Some(parent) = self.parent(current) {
            chain.push(parent.to_string());
            current = parent;
        }
        tracing::debug!("Resolved type chain for {}: {}", name, chain.join(" > "));

        let chain: Arc<[String]> = chain.into();
        self.chains.write().insert(name.to_string(), Arc::clone(&chain));
        Ok(chain)
    }

    /// Whether `name` is `ancestor` or inherits from it
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        self.chain(name)
            .map(|chain| chain.iter().any(|t| t == ancestor))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> TypeIndex {
        let mut index = TypeIndex::new();
        index.register("component", None).unwrap();
        index.register("base", Some("component")).unwrap();
        index.register("widget", Some("base")).unwrap();
        index
    }

    #[test]
    fn test_chain_nearest_first() {
        let index = index();
        let chain = index.chain("widget").unwrap();
        assert_eq!(&chain[..], &["widget", "base", "component"]);
    }

    #[test]
    fn test_chain_is_cached() {
        let index = index();
        let first = index.chain("widget").unwrap();
        let second = index.chain("widget").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_register_errors() {
        let mut index = index();
        assert_eq!(
            index.register("widget", Some("base")),
            Err(ConfigError::DuplicateType("widget".into()))
        );
        assert!(matches!(
            index.register("orphan", Some("missing")),
            Err(ConfigError::UnknownParent { .. })
        ));
        assert_eq!(index.chain("nope"), Err(ConfigError::UnknownType("nope".into())));
    }

    #[test]
    fn test_is_a() {
        let index = index();
        assert!(index.is_a("widget", "component"));
        assert!(index.is_a("widget", "widget"));
        assert!(!index.is_a("base", "widget"));
    }
}
