//! Parser module: dispatch by file extension.

pub mod docstring;
pub mod parameter;
pub mod python;
pub mod scan;
pub mod signature;
pub mod variables;

use crate::config::Settings;
use crate::error::{DocError, Result};
use crate::model::ModuleDoc;
use std::path::Path;

/// Parse a source file into a ModuleDoc based on its extension.
pub fn parse_file(path: &Path, content: &str, settings: &Settings) -> Result<ModuleDoc> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py" | "pyi") => Ok(python::parse(&file_stem(path), content, settings)),
        _ => Err(DocError::UnsupportedFile(path.to_path_buf())),
    }
}

/// "shapes/my_shape.py" → "my_shape"
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_extension() {
        let settings = Settings::default();
        let doc = parse_file(Path::new("pkg/thing.py"), "class Thing:\n    pass\n", &settings)
            .unwrap();
        assert_eq!(doc.stem, "thing");
        assert_eq!(doc.classes.len(), 1);

        let err = parse_file(Path::new("notes.txt"), "", &settings).unwrap_err();
        assert!(matches!(err, DocError::UnsupportedFile(_)));
    }
}
