//! Template rendering
//!
//! The render pipeline hands a template path and a context to a
//! [`TemplateRenderer`] and takes back a string. Two renderers ship here,
//! both using `{{name}}` (escaped) and `{{{name}}}` (raw) placeholders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::coerce::stringify;
use crate::{Component, DataMap, TemplateError};

/// Renders a template to a string. Output must be returned, never written
/// to a shared stream, and failures must not leave partial output behind.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, path: &Path, context: &TemplateContext<'_>) -> Result<String, TemplateError>;
}

/// Component being rendered plus extra variables (`content` for layouts)
pub struct TemplateContext<'a> {
    component: &'a Component,
    vars: DataMap,
}

impl<'a> TemplateContext<'a> {
    pub fn new(component: &'a Component) -> Self {
        Self {
            component,
            vars: DataMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    pub fn component(&self) -> &Component {
        self.component
    }

    pub fn vars(&self) -> &DataMap {
        &self.vars
    }

    /// Extra variables first, then component properties
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| self.component.property(name))
    }
}

/// Templates held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    templates: HashMap<PathBuf, String>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(path.into(), source.into());
        self
    }

    pub fn with(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateRenderer for MemoryTemplates {
    fn render(&self, path: &Path, context: &TemplateContext<'_>) -> Result<String, TemplateError> {
        let source = self
            .templates
            .get(path)
            .ok_or_else(|| TemplateError::NotFound(path.to_path_buf()))?;
        substitute(path, source, context)
    }
}

/// Templates read from disk below a root directory
#[derive(Debug, Clone)]
pub struct FileTemplates {
    root: PathBuf,
}

impl FileTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateRenderer for FileTemplates {
    fn render(&self, path: &Path, context: &TemplateContext<'_>) -> Result<String, TemplateError> {
        let source = std::fs::read_to_string(self.root.join(path)).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(path.to_path_buf())
            } else {
                TemplateError::Failed {
                    template: path.to_path_buf(),
                    message: err.to_string(),
                }
            }
        })?;
        substitute(path, &source, context)
    }
}

/// Replace every placeholder in `source`. Unknown names fail the render.
pub fn substitute(
    path: &Path,
    source: &str,
    context: &TemplateContext<'_>,
) -> Result<String, TemplateError> {
    let encoding = context.component().element().encoding();
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let (raw, open, close) = if after.starts_with("{{{") {
            (true, 3, "}}}")
        } else {
            (false, 2, "}}")
        };
        let end = after[open..]
            .find(close)
            .ok_or_else(|| TemplateError::Unclosed(path.to_path_buf()))?;
        let name = after[open..open + end].trim();

        let value = context
            .lookup(name)
            .ok_or_else(|| TemplateError::UnknownVariable {
                template: path.to_path_buf(),
                name: name.to_string(),
            })?;
        let text = stringify(&value);
        if raw {
            out.push_str(&text);
        } else {
            out.push_str(&encoding.encode(&text));
        }
        rest = &after[open + end + close.len()..];
    }
    out.push_str(rest);
    Ok(out)
}
