//! JSON renderer: structured output for tooling integration.
//!
//! Serializes the ModuleDoc model; categories are attached per function
//! instead of reordering anything. Members in the `Ignore` category are
//! dropped and the import prefix replaces each class's import path, as in
//! Markdown output.

use crate::config::Settings;
use crate::error::Result;
use crate::model::ModuleDoc;
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, module: &ModuleDoc, settings: &Settings) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&published(module, settings))?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn published(module: &ModuleDoc, settings: &Settings) -> ModuleDoc {
    let mut module = module.clone();
    for class in &mut module.classes {
        let categories = &settings.categories;
        class
            .functions
            .retain(|f| !categories.is_ignored(&class.name, &f.name));
        class
            .fields
            .retain(|f| !categories.is_ignored(&class.name, &f.name));
        if let Some(prefix) = settings.prefix_module() {
            class.import_path = prefix.to_string();
        }
    }
    module
}
