//! Engine Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strata_component::Settings;

/// Engine configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory templates and resources are read from
    pub resource_root: PathBuf,

    /// Settings carried by the root component type
    #[serde(flatten)]
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("."),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
