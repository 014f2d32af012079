//! Typed view of component settings

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_config::ConfigMap;
use strata_dom::{DomConfig, Encoding, EntityMode, DEFAULT_CHARSET, DEFAULT_LONELY_TAGS, DEFAULT_TAG};

/// Settings every component type resolves through its chain.
///
/// The root component type carries [`Settings::default`]; descendants and
/// instances override single keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Namespace stripped from type names for component names and URIs
    pub root_namespace: String,
    /// Directory holding per-type templates and resources
    pub root_path: String,
    /// Prefix of standalone URIs
    pub base_uri: String,
    /// Show error details in safe renders
    pub debug_mode: bool,
    pub tag: String,
    pub lonely_tags: Vec<String>,
    pub entity_mode: EntityMode,
    pub charset: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_namespace: "components".to_string(),
            root_path: "components".to_string(),
            base_uri: "/c/".to_string(),
            debug_mode: false,
            tag: DEFAULT_TAG.to_string(),
            lonely_tags: DEFAULT_LONELY_TAGS.iter().map(|t| t.to_string()).collect(),
            entity_mode: EntityMode::default(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl Settings {
    /// Read from a resolved settings map; unrelated keys are ignored
    pub fn from_map(map: ConfigMap) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }

    pub fn to_map(&self) -> ConfigMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => ConfigMap::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::new(self.entity_mode, self.charset.clone())
    }

    pub fn dom_config(&self) -> DomConfig {
        DomConfig {
            lonely_tags: self.lonely_tags.clone(),
            encoding: self.encoding(),
            ..DomConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_roundtrip_through_map() {
        let settings = Settings::default();
        let map = settings.to_map();
        assert_eq!(map.get("base_uri"), Some(&json!("/c/")));
        assert_eq!(map.get("entity_mode"), Some(&json!("compat")));
        assert_eq!(Settings::from_map(map).unwrap(), settings);
    }

    #[test]
    fn test_partial_map_uses_defaults() {
        let mut map = ConfigMap::new();
        map.insert("tag".into(), json!("section"));
        map.insert("unrelated".into(), json!(1));
        let settings = Settings::from_map(map).unwrap();
        assert_eq!(settings.tag, "section");
        assert_eq!(settings.base_uri, "/c/");
    }

    #[test]
    fn test_dom_config() {
        let settings = Settings {
            lonely_tags: vec!["input".into()],
            ..Settings::default()
        };
        let dom = settings.dom_config();
        assert!(dom.is_lonely("input"));
        assert!(!dom.is_lonely("img"));
    }
}
