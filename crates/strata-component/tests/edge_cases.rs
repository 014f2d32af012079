//! Edge case tests for strata-component

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use strata_component::{
    ComponentError, ComponentRegistry, ComponentType, DataMap, InputField, MemoryLocator,
    MemoryTemplates, RenderOptions, RenderSession, ResourceError, ResourceFile, ResourceIncluder,
    ResourceResolver, Settings, ROOT_TYPE,
};

fn data(value: Value) -> DataMap {
    match value {
        Value::Object(map) => map,
        _ => DataMap::new(),
    }
}

fn empty_resolver() -> ResourceResolver {
    ResourceResolver::new(Arc::new(MemoryLocator::new()))
}

// ============================================================================
// SAFE RENDERING
// ============================================================================

#[test]
fn test_render_safe_opaque_marker() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::new("components::broken").bindings(json!({"title": {"type": "date"}})))
        .unwrap();
    let resources = empty_resolver();
    let templates = MemoryTemplates::new();
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let mut broken = session.create("components::broken", DataMap::new()).unwrap();
    assert!(matches!(
        session.render(&mut broken, RenderOptions::default()),
        Err(ComponentError::InvalidAttributeType { .. })
    ));
    assert_eq!(session.render_safe(&mut broken), "<pre>error</pre>");
}

#[test]
fn test_render_safe_debug_details() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::new("components::broken").bindings(json!({"title": {"type": "date"}})))
        .unwrap();
    let resources = empty_resolver();
    let templates = MemoryTemplates::new();
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let mut broken = session.create("components::broken", DataMap::new()).unwrap();
    broken.set_config("debug_mode", true);
    let html = session.render_safe(&mut broken);

    assert!(html.starts_with("<h3>Error in component <var>broken</var>:</h3><pre>"));
    assert!(html.contains("Invalid type `date` for attribute binding `title`"));
}

#[test]
fn test_debug_mode_from_type_config() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            ComponentType::new("components::page")
                .config("debug_mode", true)
                .field("title", "x"),
        )
        .unwrap();
    let resources = ResourceResolver::new(Arc::new(
        MemoryLocator::new().with("components/page/template.html", ""),
    ));
    let templates = MemoryTemplates::new().with("components/page/template.html", "{{nope}}");
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let mut page = session.create("components::page", DataMap::new()).unwrap();
    let html = session.render_safe(&mut page);
    assert!(html.contains("Unknown variable `nope`"), "{}", html);
    assert_eq!(session.open_buffers(), 0);
}

// ============================================================================
// LONELY COMPONENTS
// ============================================================================

#[test]
fn test_lonely_component_has_no_body() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            ComponentType::new("components::avatar")
                .config("tag", "img")
                .attributes(json!({"alt": ""})),
        )
        .unwrap();
    let resources = empty_resolver();
    let templates = MemoryTemplates::new();
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let mut avatar = session
        .create("components::avatar", data(json!({"attributes": {"id": "me", "src": "a.png"}})))
        .unwrap();
    assert!(avatar.is_lonely());
    assert_eq!(session.render_content(&avatar).unwrap(), None);

    let html = session.render(&mut avatar, RenderOptions::default()).unwrap();
    assert_eq!(
        html,
        "<img class=\"component\" data-component=\"avatar\" alt=\"\" id=\"me\" src=\"a.png\">"
    );
}

#[test]
fn test_custom_lonely_tags() {
    let settings = Settings {
        lonely_tags: vec!["input".into()],
        ..Settings::default()
    };
    let mut registry = ComponentRegistry::with_settings(&settings);
    registry
        .register(ComponentType::new("components::field").config("tag", "input"))
        .unwrap();
    let field = registry.create("components::field", DataMap::new()).unwrap();
    assert!(field.is_lonely());
    assert_eq!(field.tag(), "input");
}

// ============================================================================
// RESOURCES
// ============================================================================

struct LinkIncluder;

impl ResourceIncluder for LinkIncluder {
    fn include(&self, file: &ResourceFile) -> Result<String, ResourceError> {
        Ok(format!("<link href=\"/{}\">", file.path.display()))
    }
}

#[test]
fn test_includer_replaces_inline_blocks() {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentType::new("components::nav")).unwrap();
    let resources = ResourceResolver::new(Arc::new(
        MemoryLocator::new().with("components/nav/stylesheet.css", "nav{}"),
    ));
    let templates = MemoryTemplates::new();
    let includer = LinkIncluder;
    let mut session = RenderSession::new(&registry, &resources, &templates).with_includer(&includer);

    let out = session.include_default_resources("components::nav").unwrap();
    assert_eq!(out, "<link href=\"/components/nav/stylesheet.css\">");
    assert!(session.included().any(|p| p == Path::new("components/nav/stylesheet.css")));
}

#[test]
fn test_used_components_deduplicated() {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentType::new("components::icon")).unwrap();
    registry
        .register(ComponentType::new("components::button").uses("components::icon"))
        .unwrap();
    registry
        .register(
            ComponentType::new("components::toolbar")
                .uses("components::button")
                .uses("components::icon")
                .uses("components::button"),
        )
        .unwrap();

    let used = registry.used_components("components::toolbar").unwrap();
    assert_eq!(&used[..], &["components::button", "components::icon"]);

    let resources = ResourceResolver::new(Arc::new(
        MemoryLocator::new().with("components/icon/stylesheet.css", "i{}"),
    ));
    let styles = resources.stylesheets(&registry, "components::toolbar").unwrap();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].owner, "icon");
}

#[test]
fn test_unknown_used_component() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::new("components::lost").uses("components::ghost"))
        .unwrap();
    assert!(matches!(
        registry.used_components("components::lost"),
        Err(ComponentError::UnknownType(ref ty)) if ty == "components::ghost"
    ));
}

#[test]
fn test_missing_resource_file_fails_render() {
    /// Claims the stylesheet exists but fails the first read
    struct Flaky(AtomicBool);

    impl strata_component::ResourceLocator for Flaky {
        fn exists(&self, path: &Path) -> bool {
            path.ends_with("stylesheet.css")
        }

        fn read(&self, path: &Path) -> Result<String, ResourceError> {
            if self.0.swap(true, Ordering::SeqCst) {
                Ok("main{}".to_string())
            } else {
                Err(ResourceError::NotFound(path.to_path_buf()))
            }
        }
    }

    let mut registry = ComponentRegistry::new();
    registry.register(ComponentType::new("components::box")).unwrap();
    let resources = ResourceResolver::new(Arc::new(Flaky(AtomicBool::new(false))));
    let templates = MemoryTemplates::new();
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let mut boxed = session.create("components::box", DataMap::new()).unwrap();
    assert!(matches!(
        session.render(&mut boxed, RenderOptions::default()),
        Err(ComponentError::Resource(ResourceError::NotFound(_)))
    ));
    assert_eq!(session.included().count(), 0);

    // the failed file is retried on the next render
    let html = session.render(&mut boxed, RenderOptions::default()).unwrap();
    assert!(html.contains("<style type=\"text/css\" data-for-component=\"box\">main{}"), "{}", html);
    assert_eq!(session.included().count(), 1);
}

// ============================================================================
// SETTINGS AND NAMES
// ============================================================================

#[test]
fn test_late_configure_changes_tag() {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentType::new("components::card")).unwrap();

    let mut settings = DataMap::new();
    settings.insert("tag".into(), json!("section"));
    assert!(!registry.configure("components::card", settings.clone()).unwrap());
    assert!(registry.configure("components::card", settings).unwrap());

    let card = registry.create("components::card", DataMap::new()).unwrap();
    assert_eq!(card.tag(), "section");
    let root = registry.create(ROOT_TYPE, DataMap::new()).unwrap();
    assert_eq!(root.tag(), "div");
}

#[test]
fn test_type_outside_namespace() {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentType::new("Admin::User_List")).unwrap();
    assert_eq!(registry.component_name("Admin::User_List").unwrap(), "admin.user-list");
    assert_eq!(
        registry.css_global_selector("Admin::User_List").unwrap(),
        ".component[data-component=\"admin\\.user-list\"]"
    );
}

#[test]
fn test_private_type_has_no_uri() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            ComponentType::new("components::report")
                .field("year", 2024)
                .input(InputField::typed("y", "year", "int")),
        )
        .unwrap();
    registry
        .register(ComponentType::new("components::secret_report").extends("components::report").private())
        .unwrap();
    registry
        .register(ComponentType::new("components::summary").extends("components::report").no_inputs())
        .unwrap();

    assert!(registry.is_public("components::report").unwrap());
    assert_eq!(registry.uri("components::secret_report", None, false).unwrap(), None);
    assert_eq!(registry.uri("components::summary", None, false).unwrap(), None);
    assert_eq!(
        registry.uri("components::report", Some(&data(json!({"y": "7"}))), true).unwrap().as_deref(),
        Some("/c/report?y=7")
    );
}

#[test]
fn test_list_input_from_uri() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            ComponentType::new("components::filter")
                .field("ids", json!([]))
                .field("strict", false)
                .input(InputField::typed("ids", "ids", "int[]"))
                .input(InputField::typed("strict", "strict", "bool")),
        )
        .unwrap();
    let resources = empty_resolver();
    let templates = MemoryTemplates::new();
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let filter = session
        .create_from_uri("/c/filter?ids=1,2,3&strict=1", None, true)
        .unwrap()
        .unwrap();
    assert_eq!(filter.borrow().get("ids"), Some(&json!([1, 2, 3])));
    assert_eq!(filter.borrow().get("strict"), Some(&json!(true)));

    let uri = registry.current_uri(&filter.borrow(), None).unwrap();
    assert_eq!(uri.as_deref(), Some("/c/filter?ids=1%2C2%2C3&strict=1"));
}

#[test]
fn test_list_input_with_unordered_indices() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            ComponentType::new("components::picker")
                .field("ids", json!([]))
                .input(InputField::typed("ids", "ids", "int[]")),
        )
        .unwrap();
    let resources = empty_resolver();
    let templates = MemoryTemplates::new();
    let mut session = RenderSession::new(&registry, &resources, &templates);

    let picker = session
        .create_from_uri("/c/picker?ids[1]=2&ids[0]=1", None, true)
        .unwrap()
        .unwrap();
    assert_eq!(picker.borrow().get("ids"), Some(&json!([1, 2])));
}

#[test]
fn test_unknown_type() {
    let registry = ComponentRegistry::new();
    assert!(matches!(
        registry.create("components::nope", DataMap::new()),
        Err(ComponentError::UnknownType(_))
    ));
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_registry_shared_across_threads() {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::new("components::tile").attributes(json!({"class": "tile"})))
        .unwrap();
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let resources = empty_resolver();
                let templates = MemoryTemplates::new();
                let mut session = RenderSession::new(&registry, &resources, &templates);
                let mut tile = session
                    .create("components::tile", data(json!({"attributes": {"id": format!("t{}", i)}})))
                    .unwrap();
                session.render(&mut tile, RenderOptions::default()).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let html = handle.join().unwrap();
        assert_eq!(
            html,
            format!("<div class=\"component tile\" data-component=\"tile\" id=\"t{}\"></div>", i)
        );
    }
}
