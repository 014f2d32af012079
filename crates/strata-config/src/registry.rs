//! Config Registry
//!
//! One settings store per registered type. Lookups walk the type chain,
//! nearest declaring type first.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde_json::Value;

use crate::{ConfigError, ConfigMap, ConfigOverrides, TypeIndex};

/// Per-type settings with inheritance along the type chain
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    types: TypeIndex,
    stores: RwLock<HashMap<String, ConfigMap>>,
    configured: RwLock<HashSet<String>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with its own default settings
    pub fn register_type(
        &mut self,
        name: &str,
        parent: Option<&str>,
        defaults: ConfigMap,
    ) -> Result<(), ConfigError> {
        self.types.register(name, parent)?;
        self.stores.get_mut().insert(name.to_string(), defaults);
        Ok(())
    }

    /// The parent-chain index
    pub fn types(&self) -> &TypeIndex {
        &self.types
    }

    /// Merge `settings` into the store of `ty`.
    ///
    /// Returns whether `ty` had already been configured before this call.
    /// Keys are only ever added or overwritten.
    pub fn configure(&self, ty: &str, settings: ConfigMap) -> Result<bool, ConfigError> {
        if !self.types.contains(ty) {
            return Err(ConfigError::UnknownType(ty.to_string()));
        }
        let already = !self.configured.write().insert(ty.to_string());

        let mut stores = self.stores.write();
        let store = stores.entry(ty.to_string()).or_default();
        for (key, value) in settings {
            store.insert(key, value);
        }
        tracing::debug!("Configured {} (already configured: {})", ty, already);
        Ok(already)
    }

    /// Resolve `key` for `ty`: instance overrides, then `ty`, then each
    /// ancestor. `Null` values count as absent.
    pub fn get(
        &self,
        ty: &str,
        key: &str,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Option<Value>, ConfigError> {
        if let Some(value) = overrides.and_then(|o| o.get(key)).filter(|v| !v.is_null()) {
            return Ok(Some(value.clone()));
        }

        let chain = self.types.chain(ty)?;
        let stores = self.stores.read();
        let found = chain
            .iter()
            .filter_map(|t| stores.get(t))
            .find_map(|store| store.get(key).filter(|v| !v.is_null()))
            .cloned();
        Ok(found)
    }

    /// Like [`get`](Self::get) with a fallback
    pub fn get_or(
        &self,
        ty: &str,
        key: &str,
        overrides: Option<&ConfigOverrides>,
        default: Value,
    ) -> Result<Value, ConfigError> {
        Ok(self.get(ty, key, overrides)?.unwrap_or(default))
    }

    /// Every key visible from `ty`, resolved. Nearer types win.
    pub fn resolved(
        &self,
        ty: &str,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<ConfigMap, ConfigError> {
        let chain = self.types.chain(ty)?;
        let stores = self.stores.read();
        let mut out = ConfigMap::new();
        for store in chain.iter().rev().filter_map(|t| stores.get(t)) {
            for (key, value) in store {
                if !value.is_null() {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        drop(stores);

        if let Some(overrides) = overrides {
            for (key, value) in overrides.iter().filter(|(_, v)| !v.is_null()) {
                out.insert(key.to_string(), value.clone());
            }
        }
        Ok(out)
    }
}
