//! Strata
//!
//! Server-side HTML rendering from composable component types.
//!
//! # Example
//! ```rust,ignore
//! use strata::{ComponentType, Config, Engine, RenderOptions};
//!
//! let mut engine = Engine::new(Config::default());
//! engine.register(ComponentType::new("components::greeting"))?;
//!
//! let mut session = engine.session();
//! let mut greeting = session.create("components::greeting", Default::default())?;
//! let html = session.render(&mut greeting, RenderOptions::default())?;
//! ```

mod config;
mod engine;

pub use config::Config;
pub use engine::{Engine, EngineError};

pub use strata_component::{
    Component, ComponentBehavior, ComponentError, ComponentRegistry, ComponentType, DataMap,
    InputField, RenderOptions, RenderSession, Settings, SharedComponent,
};

// Re-export sub-crates for advanced usage
pub use strata_component as component;
pub use strata_config as type_config;
pub use strata_dom as dom;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
