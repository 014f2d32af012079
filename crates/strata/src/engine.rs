//! Engine - Main entry point

use std::sync::Arc;

use strata_component::{
    ComponentError, ComponentRegistry, ComponentType, DataMap, FileTemplates, FsLocator,
    RenderOptions, RenderSession, ResourceLocator, ResourceResolver, TemplateRenderer,
};
use strata_config::ConfigMap;

use crate::Config;

/// Process-scoped rendering context: registered types, settings, caches and
/// the template/resource collaborators. Requests each get a
/// [`RenderSession`].
pub struct Engine {
    config: Config,
    registry: ComponentRegistry,
    resources: ResourceResolver,
    templates: Arc<dyn TemplateRenderer>,
}

impl Engine {
    /// Create an engine reading templates and resources below
    /// `config.resource_root`
    pub fn new(config: Config) -> Self {
        let locator = Arc::new(FsLocator::new(config.resource_root.clone()));
        let templates = Arc::new(FileTemplates::new(config.resource_root.clone()));
        Self::with_collaborators(config, locator, templates)
    }

    /// Create an engine from a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        Ok(Self::new(Config::from_json(text)?))
    }

    /// Create an engine with custom collaborators
    pub fn with_collaborators(
        config: Config,
        locator: Arc<dyn ResourceLocator>,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Self {
        tracing::info!("Strata {} initialized", crate::VERSION);
        Self {
            registry: ComponentRegistry::with_settings(&config.settings),
            resources: ResourceResolver::new(locator),
            templates,
            config,
        }
    }

    /// Register a component type
    pub fn register(&mut self, ty: ComponentType) -> Result<&mut Self, EngineError> {
        self.registry.register(ty)?;
        Ok(self)
    }

    /// Merge settings into a type's store
    pub fn configure(&self, ty: &str, settings: ConfigMap) -> Result<bool, EngineError> {
        Ok(self.registry.configure(ty, settings)?)
    }

    /// Start a request
    pub fn session(&self) -> RenderSession<'_> {
        RenderSession::new(&self.registry, &self.resources, self.templates.as_ref())
    }

    /// Render the standalone component addressed by `uri` in a fresh
    /// session. `None` when no public type matches.
    pub fn render_uri(&self, uri: &str, input: Option<&DataMap>) -> Result<Option<String>, EngineError> {
        tracing::info!("Rendering: {}", uri);
        let mut session = self.session();
        let Some(component) = session.create_from_uri(uri, input, true)? else {
            return Ok(None);
        };
        let html = session.render(&mut component.borrow_mut(), RenderOptions::default())?;
        Ok(Some(html))
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn resources(&self) -> &ResourceResolver {
        &self.resources
    }

    /// Get engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Engine error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
