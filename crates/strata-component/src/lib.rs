//! Strata Component - Component types and render pipeline
//!
//! Component types are declared once at startup and registered in a
//! [`ComponentRegistry`] together with their parent type. The registry
//! resolves settings, merged attribute/binding defaults and input mappings
//! along each type chain. A [`RenderSession`] turns instances into HTML for
//! one request.

mod binding;
mod coerce;
mod component;
mod definition;
mod error;
mod input;
mod merged;
mod query;
mod registry;
mod resources;
mod session;
mod settings;
mod template;

pub use binding::{Binding, BindingTable, BindingType};
pub use component::{css_global_selector, generate_id, Component};
pub use definition::{
    ComponentBehavior, ComponentType, DefaultBehavior, ATTRIBUTES, ATTRIBUTE_BINDINGS, ROOT_TYPE,
};
pub use error::{ComponentError, ResourceError, TemplateError};
pub use input::{InputField, InputType};
pub use merged::{MergedData, MergedValue};
pub use query::{percent_decode, percent_encode, Query};
pub use registry::ComponentRegistry;
pub use resources::{
    FsLocator, MemoryLocator, ResourceFile, ResourceIncluder, ResourceKind, ResourceLocator,
    ResourceResolver, LAYOUT_FILE, SCRIPT_FILE, STYLESHEET_FILE, TEMPLATE_FILE,
};
pub use session::{RenderOptions, RenderSession, SharedComponent};
pub use settings::Settings;
pub use template::{substitute, FileTemplates, MemoryTemplates, TemplateContext, TemplateRenderer};

/// Component data and flat input maps
pub type DataMap = serde_json::Map<String, serde_json::Value>;
