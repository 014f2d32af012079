//! Component resources
//!
//! Templates, layouts, stylesheets and scripts are files named by
//! convention in each type's directory. The nearest type in the chain that
//! has a file wins; stylesheets and scripts are additionally aggregated over
//! the used component types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::definition::ROOT_TYPE;
use crate::{ComponentError, ComponentRegistry, ResourceError};

pub const TEMPLATE_FILE: &str = "template.html";
pub const LAYOUT_FILE: &str = "layout.html";
pub const STYLESHEET_FILE: &str = "stylesheet.css";
pub const SCRIPT_FILE: &str = "javascript.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Stylesheet,
    Script,
}

impl ResourceKind {
    /// Conventional file name in a type directory
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Stylesheet => STYLESHEET_FILE,
            Self::Script => SCRIPT_FILE,
        }
    }

    /// Kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "css" => Some(Self::Stylesheet),
            "js" => Some(Self::Script),
            _ => None,
        }
    }
}

/// A located stylesheet or script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    pub path: PathBuf,
    pub kind: ResourceKind,
    /// Component name of the type the file belongs to
    pub owner: String,
}

impl ResourceFile {
    /// Default inline markup for `content`. Scripts are wrapped in their
    /// own function scope.
    pub fn inline(&self, content: &str) -> String {
        let path = self.path.display();
        match self.kind {
            ResourceKind::Stylesheet => format!(
                "<style type=\"text/css\" data-for-component=\"{}\">{}\n/*# sourceURL={} */</style>",
                self.owner, content, path
            ),
            ResourceKind::Script => format!(
                "<script type=\"text/javascript\" data-for-component=\"{}\">!function(){{{}}}.call(this);\n//# sourceURL={}</script>",
                self.owner, content, path
            ),
        }
    }
}

/// File lookup used for templates and resources
pub trait ResourceLocator: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> Result<String, ResourceError>;
}

/// Replaces the default inline emission of resources
pub trait ResourceIncluder {
    fn include(&self, file: &ResourceFile) -> Result<String, ResourceError>;
}

/// Files below a root directory
#[derive(Debug, Clone)]
pub struct FsLocator {
    root: PathBuf,
}

impl FsLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLocator for FsLocator {
    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }

    fn read(&self, path: &Path) -> Result<String, ResourceError> {
        std::fs::read_to_string(self.root.join(path)).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Files held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLocator {
    files: HashMap<PathBuf, String>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl ResourceLocator for MemoryLocator {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<String, ResourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_path_buf()))
    }
}

/// Located file and the type it was found for
type Located = Option<(PathBuf, String)>;

/// Process-scoped resource lookup with memoized results
pub struct ResourceResolver {
    locator: Arc<dyn ResourceLocator>,
    files: RwLock<HashMap<(String, String), Located>>,
    lists: RwLock<HashMap<(String, ResourceKind), Arc<[ResourceFile]>>>,
}

impl ResourceResolver {
    pub fn new(locator: Arc<dyn ResourceLocator>) -> Self {
        Self {
            locator,
            files: RwLock::new(HashMap::new()),
            lists: RwLock::new(HashMap::new()),
        }
    }

    pub fn locator(&self) -> &dyn ResourceLocator {
        self.locator.as_ref()
    }

    /// Read a located file
    pub fn read(&self, path: &Path) -> Result<String, ResourceError> {
        self.locator.read(path)
    }

    /// Nearest `file_name` along the chain of `ty`
    pub fn default_file(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
        file_name: &str,
    ) -> Result<Option<PathBuf>, ComponentError> {
        Ok(self.locate(registry, ty, file_name)?.map(|(path, _)| path))
    }

    fn locate(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
        file_name: &str,
    ) -> Result<Located, ComponentError> {
        let key = (ty.to_string(), file_name.to_string());
        if let Some(found) = self.files.read().get(&key) {
            return Ok(found.clone());
        }

        let mut found = None;
        for t in registry.chain(ty)?.iter() {
            let path = registry.base_path(t)?.join(file_name);
            if self.locator.exists(&path) {
                found = Some((path, t.clone()));
                break;
            }
        }
        tracing::debug!("Located {} for {}: {:?}", file_name, ty, found);

        self.files.write().insert(key, found.clone());
        Ok(found)
    }

    /// Resources of one kind for `ty`: those of every used type, then the
    /// type's own, deduplicated by path in first-seen order. Types that use
    /// each other (or themselves) contribute their own files once.
    pub fn resources(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
        kind: ResourceKind,
    ) -> Result<Arc<[ResourceFile]>, ComponentError> {
        let key = (ty.to_string(), kind);
        if let Some(files) = self.lists.read().get(&key) {
            return Ok(Arc::clone(files));
        }

        let mut files: Vec<ResourceFile> = Vec::new();
        self.collect(registry, ty, kind, &mut Vec::new(), &mut files)?;
        let mut seen = Vec::new();
        files.retain(|file| {
            if seen.contains(&file.path) {
                false
            } else {
                seen.push(file.path.clone());
                true
            }
        });

        let files: Arc<[ResourceFile]> = files.into();
        self.lists.write().insert(key, Arc::clone(&files));
        Ok(files)
    }

    /// Only complete lists are memoized: a list gathered while one of its
    /// used types is still open may lack that type's files.
    fn collect(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
        kind: ResourceKind,
        visiting: &mut Vec<String>,
        files: &mut Vec<ResourceFile>,
    ) -> Result<(), ComponentError> {
        if ty == ROOT_TYPE || visiting.iter().any(|t| t == ty) {
            return Ok(());
        }
        if let Some(cached) = self.lists.read().get(&(ty.to_string(), kind)) {
            files.extend(cached.iter().cloned());
            return Ok(());
        }

        visiting.push(ty.to_string());
        for used in registry.used_components(ty)?.iter() {
            self.collect(registry, used, kind, visiting, files)?;
        }
        visiting.pop();

        if let Some((path, owner)) = self.locate(registry, ty, kind.file_name())? {
            files.push(ResourceFile {
                path,
                kind,
                owner: registry.component_name(&owner)?,
            });
        }
        Ok(())
    }

    pub fn stylesheets(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
    ) -> Result<Arc<[ResourceFile]>, ComponentError> {
        self.resources(registry, ty, ResourceKind::Stylesheet)
    }

    pub fn scripts(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
    ) -> Result<Arc<[ResourceFile]>, ComponentError> {
        self.resources(registry, ty, ResourceKind::Script)
    }

    /// Stylesheets followed by scripts
    pub fn default_resources(
        &self,
        registry: &ComponentRegistry,
        ty: &str,
    ) -> Result<Vec<ResourceFile>, ComponentError> {
        let mut files = self.stylesheets(registry, ty)?.to_vec();
        files.extend(self.scripts(registry, ty)?.iter().cloned());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentType;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentType::new("components::icon")).unwrap();
        registry.register(ComponentType::new("components::base")).unwrap();
        registry
            .register(
                ComponentType::new("components::card")
                    .extends("components::base")
                    .uses("components::icon"),
            )
            .unwrap();
        registry
    }

    fn resolver() -> ResourceResolver {
        let locator = MemoryLocator::new()
            .with("components/icon/stylesheet.css", ".icon{}")
            .with("components/base/stylesheet.css", ".base{}")
            .with("components/base/template.html", "base")
            .with("components/card/javascript.js", "init();");
        ResourceResolver::new(Arc::new(locator))
    }

    #[test]
    fn test_nearest_file_wins() {
        let registry = registry();
        let resolver = resolver();
        assert_eq!(
            resolver.default_file(&registry, "components::card", TEMPLATE_FILE).unwrap(),
            Some(PathBuf::from("components/base/template.html"))
        );
        assert_eq!(resolver.default_file(&registry, "components::icon", TEMPLATE_FILE).unwrap(), None);
    }

    #[test]
    fn test_used_types_come_first() {
        let registry = registry();
        let resolver = resolver();
        let styles = resolver.stylesheets(&registry, "components::card").unwrap();
        let paths: Vec<_> = styles.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("components/icon/stylesheet.css"),
                PathBuf::from("components/base/stylesheet.css"),
            ]
        );
        assert_eq!(styles[1].owner, "base");
        assert_eq!(resolver.scripts(&registry, "components::card").unwrap().len(), 1);
    }

    #[test]
    fn test_self_used_type() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(ComponentType::new("components::tree").uses("components::tree"))
            .unwrap();
        let resolver = ResourceResolver::new(Arc::new(
            MemoryLocator::new().with("components/tree/stylesheet.css", ".tree{}"),
        ));

        let styles = resolver.stylesheets(&registry, "components::tree").unwrap();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].owner, "tree");
    }

    #[test]
    fn test_mutually_used_types() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(ComponentType::new("components::list").uses("components::item"))
            .unwrap();
        registry
            .register(ComponentType::new("components::item").uses("components::list"))
            .unwrap();
        let resolver = ResourceResolver::new(Arc::new(
            MemoryLocator::new()
                .with("components/list/stylesheet.css", ".list{}")
                .with("components/item/stylesheet.css", ".item{}"),
        ));

        let owners = |ty: &str| {
            resolver
                .stylesheets(&registry, ty)
                .unwrap()
                .iter()
                .map(|f| f.owner.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(owners("components::list"), vec!["item", "list"]);
        assert_eq!(owners("components::item"), vec!["list", "item"]);
    }

    #[test]
    fn test_root_has_no_resources() {
        let registry = registry();
        let resolver = resolver();
        assert!(resolver.default_resources(&registry, ROOT_TYPE).unwrap().is_empty());
    }

    #[test]
    fn test_inline_markup() {
        let file = ResourceFile {
            path: PathBuf::from("components/card/javascript.js"),
            kind: ResourceKind::Script,
            owner: "card".into(),
        };
        assert_eq!(
            file.inline("go();"),
            "<script type=\"text/javascript\" data-for-component=\"card\">!function(){go();}.call(this);\n//# sourceURL=components/card/javascript.js</script>"
        );
        assert_eq!(ResourceKind::from_path(Path::new("a/B.CSS")), Some(ResourceKind::Stylesheet));
    }
}
