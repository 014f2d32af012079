//! Strata Config - Hierarchical per-type configuration
//!
//! Component types register once, at startup, with a parent reference. The
//! resulting parent-chain index drives every inherited lookup: a setting
//! resolves from the instance overrides, then the type itself, then each
//! ancestor in turn.

mod overrides;
mod registry;
mod type_index;

pub use overrides::ConfigOverrides;
pub use registry::ConfigRegistry;
pub use type_index::TypeIndex;

/// Settings map of one type (or one instance)
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// Config registry error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Type already registered: {0}")]
    DuplicateType(String),

    #[error("Parent type {parent} of {name} is not registered")]
    UnknownParent { name: String, parent: String },
}
