//! Component Registry
//!
//! Process-scoped table of component types. Owns the per-type settings
//! stores and the memoized per-type resolutions (merged data, names, used
//! types). Everything here is read-only after startup apart from the caches,
//! so one registry can be shared by concurrent render sessions.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use strata_config::{ConfigError, ConfigMap, ConfigOverrides, ConfigRegistry};
use strata_dom::{AttrValue, AttributeMap, Element};

use crate::component::css_global_selector;
use crate::definition::{ATTRIBUTES, ROOT_TYPE};
use crate::merged::is_blank;
use crate::{
    Component, ComponentBehavior, ComponentError, ComponentType, DataMap, DefaultBehavior,
    InputField, MergedData, MergedValue, Query, Settings,
};

struct TypeEntry {
    decl: ComponentType,
    behavior: Arc<dyn ComponentBehavior>,
}

/// Names derived from a type name and the namespace settings
#[derive(Debug, Clone)]
struct TypeNames {
    component: String,
    uri_path: String,
    base_path: PathBuf,
}

pub struct ComponentRegistry {
    config: ConfigRegistry,
    types: HashMap<String, TypeEntry>,
    merged: RwLock<HashMap<String, Arc<MergedData>>>,
    used: RwLock<HashMap<String, Arc<[String]>>>,
    names: RwLock<HashMap<String, TypeNames>>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Registry holding only the root type, with default settings
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    /// Registry holding only the root type, carrying `settings`
    pub fn with_settings(settings: &Settings) -> Self {
        let root = ComponentType::root(settings);
        let mut config = ConfigRegistry::new();
        if let Err(err) = config.register_type(ROOT_TYPE, None, root.config.clone()) {
            tracing::error!("Failed to register root component type: {}", err);
        }

        let mut types = HashMap::new();
        types.insert(
            ROOT_TYPE.to_string(),
            TypeEntry {
                behavior: Arc::new(DefaultBehavior),
                decl: root,
            },
        );

        Self {
            config,
            types,
            merged: RwLock::new(HashMap::new()),
            used: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
        }
    }

    /// Register a component type. Its parent must be registered first.
    pub fn register(&mut self, mut decl: ComponentType) -> Result<(), ComponentError> {
        let parent = decl.parent.clone().unwrap_or_else(|| ROOT_TYPE.to_string());
        decl.parent = Some(parent.clone());
        if self.types.contains_key(&decl.name) {
            return Err(ConfigError::DuplicateType(decl.name.clone()).into());
        }
        if !self.types.contains_key(&parent) {
            return Err(ConfigError::UnknownParent {
                name: decl.name.clone(),
                parent,
            }
            .into());
        }
        self.validate_inputs(&decl, &parent)?;
        self.config
            .register_type(&decl.name, Some(&parent), decl.config.clone())?;

        let behavior = match &decl.behavior {
            Some(behavior) => Arc::clone(behavior),
            None => self
                .types
                .get(&parent)
                .map(|entry| Arc::clone(&entry.behavior))
                .unwrap_or_else(|| Arc::new(DefaultBehavior)),
        };
        tracing::debug!("Registered component type {} (parent {})", decl.name, parent);
        self.types
            .insert(decl.name.clone(), TypeEntry { decl, behavior });
        Ok(())
    }

    fn validate_inputs(&self, decl: &ComponentType, parent: &str) -> Result<(), ComponentError> {
        let invalid = |reason: String| ComponentError::InvalidInputConfig {
            component: decl.name.clone(),
            reason,
        };

        let mut seen = HashSet::new();
        for field in decl.input_config() {
            if !seen.insert(field.input.as_str()) {
                return Err(invalid(format!("input `{}` is mapped twice", field.input)));
            }
            let declared = decl.fields.contains_key(&field.name)
                || self.declares_field(parent, &field.name)?;
            if !declared {
                return Err(invalid(format!(
                    "input `{}` maps to undeclared field `{}`",
                    field.input, field.name
                )));
            }
        }
        Ok(())
    }

    fn declares_field(&self, ty: &str, name: &str) -> Result<bool, ComponentError> {
        Ok(self
            .chain(ty)?
            .iter()
            .filter_map(|t| self.types.get(t))
            .any(|entry| entry.decl.fields.contains_key(name)))
    }

    fn entry(&self, ty: &str) -> Result<&TypeEntry, ComponentError> {
        self.types
            .get(ty)
            .ok_or_else(|| ComponentError::UnknownType(ty.to_string()))
    }

    pub fn contains(&self, ty: &str) -> bool {
        self.types.contains_key(ty)
    }

    /// Registered type names, in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.config.types().names()
    }

    pub fn declaration(&self, ty: &str) -> Result<&ComponentType, ComponentError> {
        Ok(&self.entry(ty)?.decl)
    }

    /// Effective behavior: the type's own, else the nearest ancestor's
    pub fn behavior(&self, ty: &str) -> Result<Arc<dyn ComponentBehavior>, ComponentError> {
        Ok(Arc::clone(&self.entry(ty)?.behavior))
    }

    /// `ty` followed by its ancestors
    pub fn chain(&self, ty: &str) -> Result<Arc<[String]>, ComponentError> {
        Ok(self.config.types().chain(ty)?)
    }

    pub fn is_a(&self, ty: &str, ancestor: &str) -> bool {
        self.config.types().is_a(ty, ancestor)
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Merge settings into the store of `ty`; returns whether `ty` had
    /// been configured before
    pub fn configure(&self, ty: &str, settings: ConfigMap) -> Result<bool, ComponentError> {
        Ok(self.config.configure(ty, settings)?)
    }

    /// Resolve one setting for `ty`, shadowed by instance `overrides`
    pub fn config_value(
        &self,
        ty: &str,
        key: &str,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Option<Value>, ComponentError> {
        Ok(self.config.get(ty, key, overrides)?)
    }

    /// Typed view of every setting visible from `ty`
    pub fn settings(
        &self,
        ty: &str,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Settings, ComponentError> {
        Ok(Settings::from_map(self.config.resolved(ty, overrides)?)?)
    }

    pub fn config_registry(&self) -> &ConfigRegistry {
        &self.config
    }

    // ========================================================================
    // Names and paths
    // ========================================================================

    fn names(&self, ty: &str) -> Result<TypeNames, ComponentError> {
        if let Some(names) = self.names.read().get(ty) {
            return Ok(names.clone());
        }
        self.entry(ty)?;

        let namespace = self.string_setting(ty, "root_namespace")?;
        let root_path = PathBuf::from(self.string_setting(ty, "root_path")?);
        let names = match relative_name(ty, &namespace) {
            Some(relative) => {
                let lower = relative.to_lowercase();
                let dashed = lower.replace('_', "-");
                TypeNames {
                    component: dashed.replace("::", "."),
                    uri_path: dashed.replace("::", "/"),
                    base_path: root_path.join(lower.replace("::", "/")),
                }
            }
            None => TypeNames {
                component: ROOT_TYPE.to_string(),
                uri_path: ROOT_TYPE.to_string(),
                base_path: root_path,
            },
        };

        self.names.write().insert(ty.to_string(), names.clone());
        Ok(names)
    }

    fn string_setting(&self, ty: &str, key: &str) -> Result<String, ComponentError> {
        Ok(self
            .config_value(ty, key, None)?
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    /// `components::forms::search_box` -> `forms.search-box`
    pub fn component_name(&self, ty: &str) -> Result<String, ComponentError> {
        Ok(self.names(ty)?.component)
    }

    /// Directory holding the templates and resources of `ty`
    pub fn base_path(&self, ty: &str) -> Result<PathBuf, ComponentError> {
        Ok(self.names(ty)?.base_path)
    }

    /// `.component[data-component="..."]` for `ty`
    pub fn css_global_selector(&self, ty: &str) -> Result<String, ComponentError> {
        Ok(css_global_selector(&self.component_name(ty)?))
    }

    // ========================================================================
    // Merged data
    // ========================================================================

    /// Fully resolved merged defaults of `ty`, memoized
    pub fn merged_data(&self, ty: &str) -> Result<Arc<MergedData>, ComponentError> {
        if let Some(data) = self.merged.read().get(ty) {
            return Ok(Arc::clone(data));
        }
        let entry = self.entry(ty)?;
        let component_name = self.component_name(ty)?;

        let mut data = match &entry.decl.parent {
            None => {
                let mut seed = MergedData::new();
                let mut attributes = AttributeMap::with_class("component");
                attributes.set("data-component", component_name.as_str());
                seed.introduce(ATTRIBUTES, MergedValue::Attributes(attributes));
                seed
            }
            Some(parent) => (*self.merged_data(parent)?).clone(),
        };

        if let Some(MergedValue::Attributes(attributes)) = data.get_mut(ATTRIBUTES) {
            attributes.set("data-component", component_name.as_str());
        }

        for (name, value) in data.iter_mut() {
            if let Some(declared) = entry.decl.fields.get(name).filter(|v| !is_blank(v)) {
                value.merge(MergedValue::normalize(name, declared));
            }
        }
        for name in &entry.decl.merged_names {
            let declared = entry.decl.fields.get(name).cloned().unwrap_or(Value::Null);
            data.introduce(name, MergedValue::normalize(name, &declared));
        }

        tracing::debug!(
            "Resolved merged data for {}: {}",
            ty,
            data.names().collect::<Vec<_>>().join(", ")
        );
        let data = Arc::new(data);
        self.merged
            .write()
            .insert(ty.to_string(), Arc::clone(&data));
        Ok(data)
    }

    /// Declared defaults of the plain (non-merged) fields, nearest type wins
    pub fn field_defaults(&self, ty: &str) -> Result<DataMap, ComponentError> {
        let merged = self.merged_data(ty)?;
        let mut fields = DataMap::new();
        for t in self.chain(ty)?.iter().rev() {
            let entry = self.entry(t)?;
            for (name, value) in &entry.decl.fields {
                if !merged.contains(name) {
                    fields.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(fields)
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// Build an instance without running its lifecycle hooks.
    ///
    /// Caller keys naming merged fields are merged into the type defaults,
    /// declared fields are replaced, keys starting with `_` are ignored and
    /// anything else is rejected.
    pub fn construct(&self, ty: &str, data: DataMap) -> Result<Component, ComponentError> {
        let entry = self.entry(ty)?;
        let component_name = self.component_name(ty)?;
        let settings = self.settings(ty, None)?;
        let mut merged = (*self.merged_data(ty)?).clone();
        let mut fields = self.field_defaults(ty)?;

        for (key, value) in data {
            if key.starts_with('_') {
                continue;
            }
            if let Some(slot) = merged.get_mut(&key) {
                slot.merge(MergedValue::normalize(&key, &value));
            } else if let Some(slot) = fields.get_mut(&key) {
                *slot = value;
            } else {
                return Err(ComponentError::UnknownProperty {
                    component: component_name,
                    property: key,
                });
            }
        }

        let mut element = Element::new_in(&settings.dom_config(), &settings.tag);
        element.set_attributes(&merged.attributes());
        let bindings = merged.bindings();
        for (name, value) in merged.iter() {
            if let MergedValue::Map(_) = value {
                fields.insert(name.to_string(), value.to_json());
            }
        }

        Ok(Component::new(
            ty,
            &component_name,
            Arc::clone(&entry.behavior),
            element,
            bindings,
            fields,
        ))
    }

    /// Construct and run the lifecycle: `setup`, auto id, rights check,
    /// `initialize`
    pub fn create(&self, ty: &str, data: DataMap) -> Result<Component, ComponentError> {
        let mut component = self.construct(ty, data)?;
        self.setup(&mut component)?;
        Ok(component)
    }

    pub(crate) fn setup(&self, component: &mut Component) -> Result<(), ComponentError> {
        let behavior = component.behavior();
        behavior.setup(component);

        let has_id = component
            .get_attribute("id")
            .and_then(AttrValue::as_text)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            component.set_id(None);
        }

        if !behavior.check_rights(component) {
            tracing::warn!("Rights check denied for component {}", component.component_name());
            return Err(ComponentError::Authorization {
                component: component.component_name().to_string(),
            });
        }
        behavior.initialize(component);
        Ok(())
    }

    // ========================================================================
    // Input mapping and URIs
    // ========================================================================

    /// Map flat input to data, ancestors' mappings first
    pub fn parse_input(&self, ty: &str, input: &DataMap) -> Result<DataMap, ComponentError> {
        let mut data = DataMap::new();
        for t in self.chain(ty)?.iter().rev() {
            for field in self.entry(t)?.decl.input_config() {
                if let Some(value) = input.get(&field.input) {
                    data.insert(field.name.clone(), field.parse(value));
                }
            }
        }
        Ok(data)
    }

    /// Map data back to flat input, ancestors' mappings first
    pub fn build_input(&self, ty: &str, data: &DataMap) -> Result<DataMap, ComponentError> {
        let mut input = DataMap::new();
        for t in self.chain(ty)?.iter().rev() {
            for field in self.entry(t)?.decl.input_config() {
                if let Some(value) = data.get(&field.name).and_then(|v| field.build(v)) {
                    input.insert(field.input.clone(), value);
                }
            }
        }
        Ok(input)
    }

    /// Public types have a non-empty input mapping and are not private.
    /// The nearest declaration of each wins.
    pub fn is_public(&self, ty: &str) -> Result<bool, ComponentError> {
        let chain = self.chain(ty)?;
        let mut public = None;
        let mut inputs: Option<&Vec<InputField>> = None;
        for entry in chain.iter().filter_map(|t| self.types.get(t)) {
            public = public.or(entry.decl.public);
            inputs = inputs.or(entry.decl.input_config.as_ref());
        }
        if public == Some(false) {
            return Ok(false);
        }
        Ok(inputs.is_some_and(|inputs| !inputs.is_empty()))
    }

    /// URI of a public type, `None` otherwise. `data` is mapped through
    /// [`build_input`](Self::build_input) unless `data_is_input`.
    pub fn uri(
        &self,
        ty: &str,
        data: Option<&DataMap>,
        data_is_input: bool,
    ) -> Result<Option<String>, ComponentError> {
        if !self.is_public(ty)? {
            return Ok(None);
        }
        let mut uri = self.string_setting(ty, "base_uri")?;
        uri.push_str(&self.names(ty)?.uri_path);

        if let Some(data) = data.filter(|d| !d.is_empty()) {
            let input = if data_is_input {
                data.clone()
            } else {
                self.build_input(ty, data)?
            };
            let query = Query::from_input(&input);
            if !query.is_empty() {
                uri.push('?');
                uri.push_str(&query.to_string());
            }
        }
        Ok(Some(uri))
    }

    /// URI reproducing `component`, with some data fields replaced
    pub fn current_uri(
        &self,
        component: &Component,
        overrides: Option<&DataMap>,
    ) -> Result<Option<String>, ComponentError> {
        let mut data = component.extract_properties(None);
        if let Some(overrides) = overrides {
            data.extend(overrides.clone());
        }
        self.uri(component.type_name(), Some(&data), false)
    }

    /// Public type whose URI path is `path` (case-insensitive, `_` and `-`
    /// equivalent)
    pub fn type_for_path(&self, path: &str) -> Result<Option<String>, ComponentError> {
        let wanted = path.trim_matches('/').to_lowercase().replace('_', "-");
        if wanted.is_empty() {
            return Ok(None);
        }
        for ty in self.type_names().filter(|t| *t != ROOT_TYPE) {
            if self.names(ty)?.uri_path == wanted && self.is_public(ty)? {
                return Ok(Some(ty.to_string()));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Used components
    // ========================================================================

    /// Types whose resources `ty` depends on: the parent's list followed by
    /// the type's own declarations, without duplicates
    pub fn used_components(&self, ty: &str) -> Result<Arc<[String]>, ComponentError> {
        if let Some(used) = self.used.read().get(ty) {
            return Ok(Arc::clone(used));
        }
        let entry = self.entry(ty)?;

        let mut used: Vec<String> = match &entry.decl.parent {
            Some(parent) => self.used_components(parent)?.to_vec(),
            None => Vec::new(),
        };
        for name in &entry.decl.used_components {
            self.entry(name)?;
            if !used.contains(name) {
                used.push(name.clone());
            }
        }

        let used: Arc<[String]> = used.into();
        self.used.write().insert(ty.to_string(), Arc::clone(&used));
        Ok(used)
    }
}

/// Type name below the root namespace. `None` for the root type.
fn relative_name<'a>(ty: &'a str, namespace: &str) -> Option<&'a str> {
    if ty == ROOT_TYPE {
        return None;
    }
    let relative = if namespace.is_empty() {
        ty
    } else {
        ty.strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix("::"))
            .unwrap_or(ty)
    };
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                ComponentType::new("components::base")
                    .attributes(json!({"class": "base", "role": "region"}))
                    .field("title", "Untitled"),
            )
            .unwrap();
        registry
            .register(
                ComponentType::new("components::forms::search_box")
                    .extends("components::base")
                    .attributes(json!({"class": "search"}))
                    .bindings(json!({"data-query": {"source": "query", "type": "string"}}))
                    .field("query", Value::Null)
                    .field("page", 1)
                    .input(InputField::new("q", "query"))
                    .input(InputField::typed("p", "page", "int")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_component_names() {
        let registry = registry();
        assert_eq!(registry.component_name("components::forms::search_box").unwrap(), "forms.search-box");
        assert_eq!(registry.component_name(ROOT_TYPE).unwrap(), "component");
        assert_eq!(
            registry.base_path("components::forms::search_box").unwrap(),
            PathBuf::from("components/forms/search_box")
        );
    }

    #[test]
    fn test_merged_data_along_chain() {
        let registry = registry();
        let merged = registry.merged_data("components::forms::search_box").unwrap();
        let attributes = merged.attributes();
        assert_eq!(
            attributes.get("class").and_then(AttrValue::as_text).as_deref(),
            Some("component base search")
        );
        assert_eq!(
            attributes.get("data-component").and_then(AttrValue::as_text).as_deref(),
            Some("forms.search-box")
        );
        assert_eq!(attributes.get("role"), Some(&AttrValue::from("region")));
        assert_eq!(merged.bindings().len(), 1);
    }

    #[test]
    fn test_merged_data_memoized() {
        let registry = registry();
        let first = registry.merged_data("components::base").unwrap();
        let second = registry.merged_data("components::base").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_field_defaults_nearest_wins() {
        let registry = registry();
        let fields = registry.field_defaults("components::forms::search_box").unwrap();
        assert_eq!(fields.get("title"), Some(&json!("Untitled")));
        assert_eq!(fields.get("page"), Some(&json!(1)));
        assert!(!fields.contains_key(ATTRIBUTES));
    }

    #[test]
    fn test_construct_rejects_unknown_keys() {
        let registry = registry();
        let mut data = DataMap::new();
        data.insert("nope".into(), json!(1));
        assert!(matches!(
            registry.construct("components::base", data),
            Err(ComponentError::UnknownProperty { .. })
        ));

        let mut data = DataMap::new();
        data.insert("_internal".into(), json!(1));
        assert!(registry.construct("components::base", data).is_ok());
    }

    #[test]
    fn test_create_assigns_id() {
        let registry = registry();
        let component = registry.create("components::base", DataMap::new()).unwrap();
        assert!(component.id().is_some_and(|id| id.starts_with("base.")));
        assert!(component.is_auto_id());
    }

    #[test]
    fn test_uri() {
        let registry = registry();
        let mut data = DataMap::new();
        data.insert("query".into(), json!("a b"));
        data.insert("page".into(), json!(2));
        assert_eq!(
            registry.uri("components::forms::search_box", Some(&data), false).unwrap().as_deref(),
            Some("/c/forms/search-box?q=a+b&p=2")
        );
        assert_eq!(registry.uri("components::base", None, false).unwrap(), None);
    }

    #[test]
    fn test_type_for_path() {
        let registry = registry();
        assert_eq!(
            registry.type_for_path("Forms/Search_Box").unwrap().as_deref(),
            Some("components::forms::search_box")
        );
        assert_eq!(registry.type_for_path("base").unwrap(), None);
    }

    #[test]
    fn test_invalid_input_config() {
        let mut registry = registry();
        let err = registry
            .register(ComponentType::new("components::bad").input(InputField::new("x", "missing")))
            .unwrap_err();
        assert!(matches!(err, ComponentError::InvalidInputConfig { .. }));
    }

    #[test]
    fn test_unregistered_parent_with_inputs() {
        let mut registry = registry();
        let err = registry
            .register(
                ComponentType::new("components::orphan")
                    .extends("components::missing")
                    .field("q", "")
                    .input(InputField::new("q", "q")),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ComponentError::Config(ConfigError::UnknownParent { ref parent, .. }) if parent == "components::missing"
        ));
        assert!(!registry.contains("components::orphan"));

        let err = registry.register(ComponentType::new("components::base")).unwrap_err();
        assert!(matches!(err, ComponentError::Config(ConfigError::DuplicateType(_))));
    }
}
