//! Instance-level config overrides

use serde_json::Value;

use crate::ConfigMap;

/// Settings written on one instance. They shadow the type chain for that
/// instance only and never touch the per-type stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    values: ConfigMap,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set an override; `Null` counts as absent on lookup
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<ConfigMap> for ConfigOverrides {
    fn from(values: ConfigMap) -> Self {
        Self { values }
    }
}
