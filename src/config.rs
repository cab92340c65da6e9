//! Generation settings and the category metadata file.
//!
//! The metadata file maps class names to ordered categories:
//!
//! ```json
//! {
//!   "Shape": {
//!     "Constructor": { "description": "", "functions": ["__init__"] },
//!     "Geometry": { "description": "Size helpers.", "functions": ["area"] },
//!     "Ignore": { "description": "", "functions": ["debug"] }
//!   }
//! }
//! ```
//!
//! Loaded once and passed by reference; nothing mutates it afterwards.

use crate::error::{DocError, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Members of this category are dropped from the output.
pub const IGNORE: &str = "Ignore";
/// Members of this category are emitted without a category heading.
pub const CONSTRUCTOR: &str = "Constructor";

static RE_REEXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^from\s+\.(\S*)\s+import\s+(.+)$").unwrap());

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub functions: Vec<String>,
}

/// Per-class ordered categories.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct CategoryConfig {
    classes: IndexMap<String, IndexMap<String, Category>>,
}

impl CategoryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DocError::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| DocError::Metadata {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn categories(&self, class_name: &str) -> Option<&IndexMap<String, Category>> {
        self.classes.get(class_name)
    }

    /// The first category listing `member`, if the class is configured at all.
    pub fn category_of(&self, class_name: &str, member: &str) -> Option<&str> {
        self.categories(class_name)?
            .iter()
            .find(|(_, c)| c.functions.iter().any(|f| f == member))
            .map(|(name, _)| name.as_str())
    }

    pub fn is_ignored(&self, class_name: &str, member: &str) -> bool {
        self.category_of(class_name, member) == Some(IGNORE)
    }
}

/// Everything the extractor and renderers need besides the source itself.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Top-level import name, derived from the input directory name
    pub root_import: String,
    /// Classes re-exported by the package's `__init__.py`
    pub reexports: Vec<String>,
    /// Replacement for the dotted path of every import example
    pub import_prefix: Option<String>,
    pub categories: CategoryConfig,
}

impl Settings {
    /// Settings for a package directory, reading its `__init__.py` if present.
    pub fn for_package(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(DocError::NotADirectory(dir.to_path_buf()));
        }
        let root_import = dir
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| dir.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let init = dir.join("__init__.py");
        let reexports = if init.is_file() {
            let text = fs::read_to_string(&init).map_err(|e| DocError::io(&init, e))?;
            parse_reexports(&text)
        } else {
            Vec::new()
        };

        Ok(Self {
            root_import,
            reexports,
            ..Default::default()
        })
    }

    /// Dotted path shown in the import example of `class_name` from `stem.py`.
    /// Module named by `import_prefix`, with any leading `from ` dropped.
    pub fn prefix_module(&self) -> Option<&str> {
        self.import_prefix.as_deref().map(|prefix| {
            let prefix = prefix.trim();
            prefix.strip_prefix("from ").unwrap_or(prefix).trim()
        })
    }

    pub fn import_path(&self, stem: &str, class_name: &str) -> String {
        if self.root_import.is_empty() {
            stem.to_string()
        } else if self.reexports.iter().any(|r| r == class_name) {
            self.root_import.clone()
        } else {
            format!("{}.{}", self.root_import, stem)
        }
    }
}

/// Names bound by `from .module import A, B as C` lines.
pub fn parse_reexports(init_text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in init_text.lines() {
        let Some(caps) = RE_REEXPORT.captures(line.trim()) else {
            continue;
        };
        let list = caps[2].trim_matches(|c| c == '(' || c == ')' || c == '\\');
        for item in list.split(',') {
            let item = item.trim();
            let bound = item.rsplit(" as ").next().unwrap_or(item).trim();
            if !bound.is_empty() && bound != "*" {
                names.push(bound.to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"{
        "Shape": {
            "Constructor": {"description": "", "functions": ["__init__"]},
            "Geometry": {"description": "Size helpers.", "functions": ["area", "scale"]},
            "Ignore": {"functions": ["debug"]}
        }
    }"#;

    #[test]
    fn categories_keep_file_order() {
        let config: CategoryConfig = serde_json::from_str(METADATA).unwrap();
        let names: Vec<_> = config.categories("Shape").unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["Constructor", "Geometry", "Ignore"]);
    }

    #[test]
    fn category_lookup() {
        let config: CategoryConfig = serde_json::from_str(METADATA).unwrap();
        assert_eq!(config.category_of("Shape", "scale"), Some("Geometry"));
        assert_eq!(config.category_of("Shape", "missing"), None);
        assert_eq!(config.category_of("Other", "area"), None);
        assert!(config.is_ignored("Shape", "debug"));
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let config: CategoryConfig = serde_json::from_str(METADATA).unwrap();
        assert_eq!(config.categories("Shape").unwrap()["Ignore"].description, "");
    }

    #[test]
    fn reexports_from_init() {
        let init = "from .shape import Shape\nfrom .circle import Circle, Ring as Annulus\nimport os\n";
        assert_eq!(parse_reexports(init), vec!["Shape", "Circle", "Annulus"]);
    }

    #[test]
    fn import_path_uses_reexports() {
        let settings = Settings {
            root_import: "shapes".to_string(),
            reexports: vec!["Shape".to_string()],
            ..Default::default()
        };
        assert_eq!(settings.import_path("shape", "Shape"), "shapes");
        assert_eq!(settings.import_path("circle", "Circle"), "shapes.circle");
    }

    #[test]
    fn prefix_module_drops_from() {
        let mut settings = Settings::default();
        assert_eq!(settings.prefix_module(), None);
        settings.import_prefix = Some(" from lib.public ".to_string());
        assert_eq!(settings.prefix_module(), Some("lib.public"));
        settings.import_prefix = Some("lib".to_string());
        assert_eq!(settings.prefix_module(), Some("lib"));
    }

    #[test]
    fn missing_metadata_file() {
        let err = CategoryConfig::load(Path::new("/nonexistent/metadata.json")).unwrap_err();
        assert!(matches!(err, DocError::MissingFile(_)));
    }
}
