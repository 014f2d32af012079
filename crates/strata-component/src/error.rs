//! Component errors

use std::path::PathBuf;

use strata_config::ConfigError;

/// Component creation / rendering error
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Operation not allowed for component {component}")]
    Authorization { component: String },

    #[error("Component {component} must define {method} to use instance_for")]
    Configuration { component: String, method: &'static str },

    #[error("Another component is already running as the standalone instance: {existing}")]
    DuplicateStandalone { existing: String },

    #[error("Invalid type `{ty}` for attribute binding `{attribute}`")]
    InvalidAttributeType { attribute: String, ty: String },

    #[error("Unknown component type: {0}")]
    UnknownType(String),

    #[error("Unknown property `{property}` for component {component}")]
    UnknownProperty { component: String, property: String },

    #[error("Invalid input config for {component}: {reason}")]
    InvalidInputConfig { component: String, reason: String },

    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Template rendering error
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),

    #[error("Unknown variable `{name}` in template {template}")]
    UnknownVariable { template: PathBuf, name: String },

    #[error("Unclosed placeholder in template {0}")]
    Unclosed(PathBuf),

    #[error("Template {template} failed: {message}")]
    Failed { template: PathBuf, message: String },
}

/// Resource lookup error
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
