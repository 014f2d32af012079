//! Render Session
//!
//! Request-scoped state: the shared instances created through
//! [`instance_for`](RenderSession::instance_for), the standalone instance and
//! the set of resources already included in the response. Dropping or
//! [`reset`](RenderSession::reset)ting the session ends the request.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use strata_dom::{encode_entities, EntityMode};

use crate::coerce::truthy;
use crate::definition::ROOT_TYPE;
use crate::resources::{LAYOUT_FILE, TEMPLATE_FILE};
use crate::{
    Component, ComponentError, ComponentRegistry, DataMap, Query, ResourceFile, ResourceIncluder,
    ResourceResolver, TemplateContext, TemplateRenderer,
};

/// Instance shared between the session and its callers
pub type SharedComponent = Rc<RefCell<Component>>;

/// What [`RenderSession::render`] emits around the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append the type's stylesheets and scripts not yet included
    pub include_resources: bool,
    /// Wrap the output in the type's layout, if any
    pub in_layout: bool,
    /// Emit the component's own open and close tags
    pub in_tag: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_resources: true,
            in_layout: true,
            in_tag: true,
        }
    }
}

impl RenderOptions {
    pub fn without_resources(mut self) -> Self {
        self.include_resources = false;
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.in_layout = false;
        self
    }

    pub fn without_tag(mut self) -> Self {
        self.in_tag = false;
        self
    }
}

/// Output capture scope around one template render. Released on every exit
/// path; an unfinished buffer means the render failed and its output is gone.
struct OutputBuffer<'s> {
    depth: &'s Cell<usize>,
    path: &'s Path,
    finished: bool,
}

impl<'s> OutputBuffer<'s> {
    fn open(depth: &'s Cell<usize>, path: &'s Path) -> Self {
        depth.set(depth.get() + 1);
        Self {
            depth,
            path,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for OutputBuffer<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
        if !self.finished {
            tracing::debug!("Discarded partial output of {}", self.path.display());
        }
    }
}

pub struct RenderSession<'a> {
    registry: &'a ComponentRegistry,
    resources: &'a ResourceResolver,
    templates: &'a dyn TemplateRenderer,
    includer: Option<&'a dyn ResourceIncluder>,
    included: HashSet<PathBuf>,
    instances: HashMap<(String, String), SharedComponent>,
    standalone: Option<SharedComponent>,
    buffers: Cell<usize>,
}

impl<'a> RenderSession<'a> {
    pub fn new(
        registry: &'a ComponentRegistry,
        resources: &'a ResourceResolver,
        templates: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            registry,
            resources,
            templates,
            includer: None,
            included: HashSet::new(),
            instances: HashMap::new(),
            standalone: None,
            buffers: Cell::new(0),
        }
    }

    /// Emit resources through `includer` instead of inline blocks
    pub fn with_includer(mut self, includer: &'a dyn ResourceIncluder) -> Self {
        self.includer = Some(includer);
        self
    }

    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// Fresh instance with its lifecycle run
    pub fn create(&self, ty: &str, data: DataMap) -> Result<Component, ComponentError> {
        self.registry.create(ty, data)
    }

    /// Shared instance keyed by the type's `build_instance_key(args)`.
    /// The first instance created for a key is returned from then on.
    pub fn instance_for(&mut self, ty: &str, args: &Value) -> Result<SharedComponent, ComponentError> {
        let component_name = self.registry.component_name(ty)?;
        let missing = |method| ComponentError::Configuration {
            component: component_name.clone(),
            method,
        };
        if ty == ROOT_TYPE {
            return Err(missing("build_instance_key"));
        }

        let behavior = self.registry.behavior(ty)?;
        let key = behavior
            .build_instance_key(args)
            .ok_or_else(|| missing("build_instance_key"))?;
        let slot = (ty.to_string(), key);
        if let Some(existing) = self.instances.get(&slot) {
            return Ok(Rc::clone(existing));
        }

        let data = behavior
            .build_instance_data(args)
            .ok_or_else(|| missing("build_instance_data"))?;
        let component = Rc::new(RefCell::new(self.registry.create(ty, data)?));
        tracing::debug!("Created shared instance {} for key {}", ty, slot.1);
        self.instances.insert(slot, Rc::clone(&component));
        Ok(component)
    }

    /// Create the standalone instance for `uri`.
    ///
    /// Returns `None` when the URI is outside `base_uri` (with
    /// `uri_has_prefix`) or names no public type. Query parameters in the URI
    /// are read as input; entries of `input` take precedence.
    pub fn create_from_uri(
        &mut self,
        uri: &str,
        input: Option<&DataMap>,
        uri_has_prefix: bool,
    ) -> Result<Option<SharedComponent>, ComponentError> {
        if let Some(existing) = &self.standalone {
            let existing = existing
                .try_borrow()
                .map(|c| c.component_name().to_string())
                .unwrap_or_default();
            return Err(ComponentError::DuplicateStandalone { existing });
        }

        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        let path = if uri_has_prefix {
            let prefix = self
                .registry
                .config_value(ROOT_TYPE, "base_uri", None)?
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest,
                None => return Ok(None),
            }
        } else {
            path
        };
        let Some(ty) = self.registry.type_for_path(path)? else {
            return Ok(None);
        };

        let mut flat = Query::parse(query).to_input();
        if let Some(input) = input {
            flat.extend(input.clone());
        }
        let data = self.registry.parse_input(&ty, &flat)?;
        let component = Rc::new(RefCell::new(self.registry.create(&ty, data)?));
        tracing::info!("Created standalone component {} from {}", ty, uri);

        self.standalone = Some(Rc::clone(&component));
        Ok(Some(component))
    }

    pub fn standalone(&self) -> Option<SharedComponent> {
        self.standalone.clone()
    }

    pub fn is_standalone_instance(&self, component: &SharedComponent) -> bool {
        self.standalone
            .as_ref()
            .is_some_and(|standalone| Rc::ptr_eq(standalone, component))
    }

    /// Whether `component` was created through [`instance_for`](Self::instance_for)
    pub fn is_dedicated_instance(&self, component: &SharedComponent) -> bool {
        self.instances.values().any(|c| Rc::ptr_eq(c, component))
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render `component` to HTML. Errors propagate.
    pub fn render(
        &mut self,
        component: &mut Component,
        options: RenderOptions,
    ) -> Result<String, ComponentError> {
        let behavior = component.behavior();
        behavior.before_render(component);

        let mut content = String::new();
        if options.in_tag {
            content.push_str(&component.open_tag()?);
        }
        if let Some(body) = self.render_content(component)? {
            content.push_str(&body);
            if options.in_tag {
                content.push_str(&component.close_tag());
            }
        }

        if options.in_layout {
            let default = self
                .resources
                .default_file(self.registry, component.type_name(), LAYOUT_FILE)?;
            if let Some(layout) = behavior.layout(component, default) {
                let context = TemplateContext::new(component).with("content", content);
                content = self.render_template(&layout, &context)?;
            }
        }

        if options.include_resources {
            content.push_str(&self.include_resources(component)?);
        }

        behavior.after_render(component, &content);
        Ok(content)
    }

    /// Body of `component`: its template, else its child nodes. `None` for
    /// lonely components.
    pub fn render_content(&self, component: &Component) -> Result<Option<String>, ComponentError> {
        if component.is_lonely() {
            return Ok(None);
        }
        let default = self
            .resources
            .default_file(self.registry, component.type_name(), TEMPLATE_FILE)?;
        match component.behavior().template(component, default) {
            Some(path) => {
                let context = TemplateContext::new(component);
                Ok(Some(self.render_template(&path, &context)?))
            }
            None => Ok(component.element().html_content()),
        }
    }

    fn render_template(
        &self,
        path: &Path,
        context: &TemplateContext<'_>,
    ) -> Result<String, ComponentError> {
        let buffer = OutputBuffer::open(&self.buffers, path);
        let output = self.templates.render(path, context)?;
        buffer.finish();
        Ok(output)
    }

    /// Render with every option on; never fails.
    ///
    /// Errors become a `<pre>` block: with `debug_mode` it names the
    /// component and holds the error chain, otherwise an opaque marker.
    pub fn render_safe(&mut self, component: &mut Component) -> String {
        match self.render(component, RenderOptions::default()) {
            Ok(content) => content,
            Err(err) => {
                tracing::error!(
                    "Failed to render component {}: {}",
                    component.component_name(),
                    err
                );
                let debug = self
                    .registry
                    .config_value(component.type_name(), "debug_mode", Some(component.config()))
                    .ok()
                    .flatten()
                    .is_some_and(|v| truthy(&v));
                if debug {
                    format!(
                        "<h3>Error in component <var>{}</var>:</h3><pre>{}</pre>",
                        encode_entities(component.component_name(), EntityMode::Compat),
                        encode_entities(&describe(&err), EntityMode::Compat)
                    )
                } else {
                    "<pre>error</pre>".to_string()
                }
            }
        }
    }

    /// Number of template renders in progress
    pub fn open_buffers(&self) -> usize {
        self.buffers.get()
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Resources of the component's type not yet included in this session
    pub fn include_resources(&mut self, component: &Component) -> Result<String, ComponentError> {
        self.include_default_resources(component.type_name())
    }

    /// Resources of `ty` not yet included in this session
    pub fn include_default_resources(&mut self, ty: &str) -> Result<String, ComponentError> {
        let files = self.resources.default_resources(self.registry, ty)?;
        self.include(&files)
    }

    /// Emit each file once per session. Nothing is marked as included
    /// unless every file was produced.
    pub fn include(&mut self, files: &[ResourceFile]) -> Result<String, ComponentError> {
        let mut out = String::new();
        let mut emitted: Vec<&Path> = Vec::new();
        for file in files {
            if self.included.contains(&file.path) || emitted.contains(&file.path.as_path()) {
                continue;
            }
            match self.includer {
                Some(includer) => out.push_str(&includer.include(file)?),
                None => {
                    let content = self.resources.read(&file.path)?;
                    out.push_str(&file.inline(&content));
                }
            }
            emitted.push(&file.path);
        }
        self.included
            .extend(emitted.into_iter().map(Path::to_path_buf));
        Ok(out)
    }

    /// Paths emitted so far
    pub fn included(&self) -> impl Iterator<Item = &Path> {
        self.included.iter().map(PathBuf::as_path)
    }

    /// Forget instances, the standalone slot and included resources
    pub fn reset(&mut self) {
        self.included.clear();
        self.instances.clear();
        self.standalone = None;
        tracing::debug!("Render session reset");
    }
}

/// Error message followed by its sources
fn describe(err: &ComponentError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
