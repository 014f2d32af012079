//! Component type declarations
//!
//! A [`ComponentType`] is registered once at startup with its parent, its
//! declared fields and their defaults, its merged-data names, input mapping,
//! used types, default settings and behavior hooks.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use strata_config::ConfigMap;

use crate::{Component, DataMap, InputField, Settings};

/// Name of the root component type
pub const ROOT_TYPE: &str = "component";
/// Merged field holding the static attribute map
pub const ATTRIBUTES: &str = "attributes";
/// Merged field holding the attribute binding table
pub const ATTRIBUTE_BINDINGS: &str = "attribute_bindings";

/// Lifecycle hooks of a component type.
///
/// Types without their own behavior inherit the nearest ancestor's.
pub trait ComponentBehavior: Send + Sync {
    /// Runs first after construction
    fn setup(&self, _component: &mut Component) {}

    /// Deny to abort creation with an authorization error
    fn check_rights(&self, _component: &Component) -> bool {
        true
    }

    fn initialize(&self, _component: &mut Component) {}

    fn before_render(&self, _component: &mut Component) {}

    /// Observes the rendered content; cannot change it
    fn after_render(&self, _component: &Component, _content: &str) {}

    /// Template to render the body with. `default` is the nearest
    /// `template.html` along the type chain.
    fn template(&self, _component: &Component, default: Option<PathBuf>) -> Option<PathBuf> {
        default
    }

    /// Layout wrapping the rendered content
    fn layout(&self, _component: &Component, default: Option<PathBuf>) -> Option<PathBuf> {
        default
    }

    /// Key identifying the shared instance for `args`
    fn build_instance_key(&self, _args: &Value) -> Option<String> {
        None
    }

    /// Construction data for the shared instance for `args`
    fn build_instance_data(&self, _args: &Value) -> Option<DataMap> {
        None
    }
}

/// Behavior with every hook left at its default
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBehavior;

impl ComponentBehavior for DefaultBehavior {}

/// Declaration of a component type
#[derive(Clone)]
pub struct ComponentType {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) fields: DataMap,
    pub(crate) merged_names: Vec<String>,
    pub(crate) input_config: Option<Vec<InputField>>,
    pub(crate) used_components: Vec<String>,
    pub(crate) public: Option<bool>,
    pub(crate) config: ConfigMap,
    pub(crate) behavior: Option<Arc<dyn ComponentBehavior>>,
}

impl ComponentType {
    /// New type deriving from the root type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(ROOT_TYPE.to_string()),
            fields: DataMap::new(),
            merged_names: Vec::new(),
            input_config: None,
            used_components: Vec::new(),
            public: None,
            config: ConfigMap::new(),
            behavior: None,
        }
    }

    /// The root type: introduces `attributes` and `attribute_bindings` and
    /// carries the default settings
    pub fn root(settings: &Settings) -> Self {
        Self {
            parent: None,
            config: settings.to_map(),
            behavior: Some(Arc::new(DefaultBehavior)),
            ..Self::new(ROOT_TYPE)
        }
        .merged(ATTRIBUTES, Value::Object(DataMap::new()))
        .merged(ATTRIBUTE_BINDINGS, Value::Object(DataMap::new()))
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare a field with its default value
    pub fn field(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), default.into());
        self
    }

    /// Declare a field merged (not replaced) along the type chain and with
    /// caller data
    pub fn merged(mut self, name: &str, default: impl Into<Value>) -> Self {
        if !self.merged_names.iter().any(|n| n == name) {
            self.merged_names.push(name.to_string());
        }
        self.field(name, default)
    }

    /// Default attributes, merged over the parent's
    pub fn attributes(self, attributes: Value) -> Self {
        self.field(ATTRIBUTES, attributes)
    }

    /// Attribute bindings, merged over the parent's by attribute name
    pub fn bindings(self, bindings: Value) -> Self {
        self.field(ATTRIBUTE_BINDINGS, bindings)
    }

    pub fn input(mut self, field: InputField) -> Self {
        self.input_config.get_or_insert_with(Vec::new).push(field);
        self
    }

    /// Declare an empty input mapping, hiding inherited inputs from
    /// [`is_public`](crate::ComponentRegistry::is_public)
    pub fn no_inputs(mut self) -> Self {
        self.input_config = Some(Vec::new());
        self
    }

    /// Type whose resources are included along with this one's
    pub fn uses(mut self, ty: impl Into<String>) -> Self {
        self.used_components.push(ty.into());
        self
    }

    /// Never reachable by URI
    pub fn private(mut self) -> Self {
        self.public = Some(false);
        self
    }

    /// Default setting for this type and its descendants
    pub fn config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    pub fn behavior(mut self, behavior: impl ComponentBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Own input mapping, without inherited entries
    pub fn input_config(&self) -> &[InputField] {
        self.input_config.as_deref().unwrap_or_default()
    }

    pub fn is_merged(&self, name: &str) -> bool {
        self.merged_names.iter().any(|n| n == name)
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("merged_names", &self.merged_names)
            .field("input_config", &self.input_config)
            .field("used_components", &self.used_components)
            .field("public", &self.public)
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}
