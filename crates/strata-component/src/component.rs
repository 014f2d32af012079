//! Component instances
//!
//! A component is an [`Element`] whose attributes, bindings and data fields
//! were resolved from its type chain and the caller's data. Instances are
//! built by [`ComponentRegistry`](crate::ComponentRegistry) and rendered by a
//! [`RenderSession`](crate::RenderSession).

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use strata_config::ConfigOverrides;
use strata_dom::{css_escape, AttrValue, AttributeMap, Element};

use crate::definition::{ATTRIBUTES, ATTRIBUTE_BINDINGS};
use crate::{BindingTable, ComponentBehavior, ComponentError, DataMap};

pub struct Component {
    ty: String,
    name: String,
    behavior: Arc<dyn ComponentBehavior>,
    element: Element,
    bindings: BindingTable,
    data: DataMap,
    config: ConfigOverrides,
    auto_id: bool,
}

impl Component {
    pub(crate) fn new(
        ty: &str,
        name: &str,
        behavior: Arc<dyn ComponentBehavior>,
        element: Element,
        bindings: BindingTable,
        data: DataMap,
    ) -> Self {
        Self {
            ty: ty.to_string(),
            name: name.to_string(),
            behavior,
            element,
            bindings,
            data,
            config: ConfigOverrides::new(),
            auto_id: false,
        }
    }

    /// Registered type name
    pub fn type_name(&self) -> &str {
        &self.ty
    }

    /// Component name, as written to `data-component`
    pub fn component_name(&self) -> &str {
        &self.name
    }

    pub(crate) fn behavior(&self) -> Arc<dyn ComponentBehavior> {
        Arc::clone(&self.behavior)
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn tag(&self) -> &str {
        &self.element.tag
    }

    /// Lonely components render no body and no closing tag
    pub fn is_lonely(&self) -> bool {
        self.element.is_lonely()
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attributes(&self) -> &AttributeMap {
        self.element.attributes()
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AttrValue> {
        self.element.get_attribute(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttrValue>) -> &mut Self {
        self.element.set_attribute(name, value);
        self
    }

    /// Merge `attributes` into the current ones
    pub fn set_attributes(&mut self, attributes: &AttributeMap) -> &mut Self {
        self.element.set_attributes(attributes);
        self
    }

    pub fn unset_attribute(&mut self, name: &str) -> &mut Self {
        self.element.unset_attribute(name);
        self
    }

    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        self.element.add_class(classes);
        self
    }

    pub fn remove_class(&mut self, classes: &str) -> &mut Self {
        self.element.remove_class(classes);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.element.has_class(class)
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingTable {
        &mut self.bindings
    }

    /// Bound attribute values coerced per binding type
    pub fn bound_attributes(&self) -> Result<AttributeMap, ComponentError> {
        self.bindings.serialize(|source| self.property(source))
    }

    /// Open tag with the bound attributes merged over the static ones
    pub fn open_tag(&self) -> Result<String, ComponentError> {
        let bound = self.bound_attributes()?;
        Ok(self.element.open_tag(Some(&bound)))
    }

    pub fn close_tag(&self) -> String {
        self.element.close_tag()
    }

    // ------------------------------------------------------------------
    // Data fields
    // ------------------------------------------------------------------

    /// Declared data field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Overwrite a declared data field
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ComponentError> {
        match self.data.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(ComponentError::UnknownProperty {
                component: self.name.clone(),
                property: name.to_string(),
            }),
        }
    }

    pub fn data(&self) -> &DataMap {
        &self.data
    }

    /// Any readable property: data fields, `attributes`,
    /// `attribute_bindings`, `id` and `component_name`
    pub fn property(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.data.get(name) {
            return Some(value.clone());
        }
        match name {
            ATTRIBUTES => Some(self.attributes().to_json()),
            ATTRIBUTE_BINDINGS => Some(self.bindings.to_json()),
            "id" => self.id().map(Value::String),
            "component_name" => Some(Value::String(self.name.clone())),
            _ => None,
        }
    }

    /// Data fields plus `attributes`, optionally limited to `names`
    pub fn extract_properties(&self, names: Option<&[&str]>) -> DataMap {
        let mut values = self.data.clone();
        values.insert(ATTRIBUTES.to_string(), self.attributes().to_json());
        match names {
            Some(names) => values
                .into_iter()
                .filter(|(k, _)| names.contains(&k.as_str()))
                .collect(),
            None => values,
        }
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Instance-level settings, shadowing the type chain
    pub fn config(&self) -> &ConfigOverrides {
        &self.config
    }

    pub fn set_config(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.config.set(key, value);
        self
    }

    // ------------------------------------------------------------------
    // Ids and selectors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Option<String> {
        self.get_attribute("id")
            .and_then(AttrValue::as_text)
            .filter(|id| !id.is_empty())
    }

    /// Whether the current id was generated rather than chosen
    pub fn is_auto_id(&self) -> bool {
        self.auto_id
    }

    /// Id with an optional `.suffix`; generates an id when none is set
    pub fn get_id(&mut self, suffix: Option<&str>) -> String {
        let id = match self.id() {
            Some(id) => id,
            None => self.set_id(None),
        };
        match suffix.filter(|s| !s.is_empty()) {
            Some(suffix) => format!("{}.{}", id, suffix),
            None => id,
        }
    }

    /// Assign `{component_name}.{suffix}`, or a random suffix when `None`
    pub fn set_id(&mut self, suffix: Option<&str>) -> String {
        let suffix = suffix.filter(|s| !s.is_empty());
        self.auto_id = suffix.is_none();
        let id = generate_id(&self.name, suffix);
        self.element.set_attribute("id", id.as_str());
        id
    }

    /// Id selector for this instance (`#` prefixed, escaped)
    pub fn css_selector(&mut self, suffix: Option<&str>) -> String {
        format!("#{}", css_escape(&self.get_id(suffix)))
    }

    /// Form field name: stable per type for generated ids, per instance
    /// otherwise
    pub fn unique_form_name(&mut self, suffix: Option<&str>) -> String {
        let base = if self.auto_id {
            self.name.clone()
        } else {
            self.get_id(None)
        };
        let mut name = base.replace('.', "_");
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            name.push('_');
            name.push_str(suffix);
        }
        name
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type", &self.ty)
            .field("name", &self.name)
            .field("element", &self.element)
            .field("bindings", &self.bindings)
            .field("data", &self.data)
            .field("config", &self.config)
            .field("auto_id", &self.auto_id)
            .finish()
    }
}

/// `{component_name}.{suffix}` with a random six hex digit suffix by default
pub fn generate_id(component_name: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}.{}", component_name, suffix),
        None => {
            let n: u32 = rand::thread_rng().gen_range(0..0x100_0000);
            format!("{}.{:06x}", component_name, n)
        }
    }
}

/// Selector matching every instance of a component name
pub fn css_global_selector(component_name: &str) -> String {
    format!(".component[data-component=\"{}\"]", css_escape(component_name))
}
