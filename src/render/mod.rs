//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod markdown;

use crate::config::Settings;
use crate::error::{DocError, Result};
use crate::model::ModuleDoc;

/// Trait for rendering a ModuleDoc into a specific output format.
pub trait Renderer {
    fn render(&self, module: &ModuleDoc, settings: &Settings) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(DocError::UnknownFormat(format.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats() {
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("json").unwrap().file_extension(), "json");
        assert!(matches!(
            create_renderer("html"),
            Err(DocError::UnknownFormat(_))
        ));
    }
}
