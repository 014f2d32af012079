//! Example: Basic usage of Strata

use std::sync::Arc;

use serde_json::json;
use strata::component::{MemoryLocator, MemoryTemplates};
use strata::{ComponentType, Config, Engine, InputField, RenderOptions};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let locator = MemoryLocator::new()
        .with("components/greeting/template.html", "")
        .with("components/greeting/stylesheet.css", ".greeting { color: teal; }");
    let templates = MemoryTemplates::new()
        .with("components/greeting/template.html", "<p>Hello, {{name}}!</p>");

    let mut engine = Engine::with_collaborators(Config::default(), Arc::new(locator), Arc::new(templates));
    engine.register(
        ComponentType::new("components::greeting")
            .field("name", "world")
            .attributes(json!({"class": "card"}))
            .input(InputField::new("name", "name")),
    )?;

    println!("Strata v{} initialized", strata::VERSION);

    let mut session = engine.session();
    let mut greeting = session.create("components::greeting", Default::default())?;
    println!("{}", session.render(&mut greeting, RenderOptions::default())?);

    if let Some(html) = engine.render_uri("/c/greeting?name=Strata", None)? {
        println!("{}", html);
    }
    Ok(())
}
