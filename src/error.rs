//! Error types for the generation pipeline.
//!
//! Only boundary failures are errors. Malformed docstrings, uncategorized
//! functions and missing ancestor documents are recovered locally and logged.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocError>;

#[derive(Error, Debug)]
pub enum DocError {
    /// A required input file does not exist
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A path expected to be a directory is something else
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Input file with an extension we cannot parse
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The category metadata file is not valid JSON of the expected shape
    #[error("invalid metadata in {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `--override` value without `=`
    #[error("invalid override {0:?}: expected EXPECTED=ACTUAL")]
    InvalidOverride(String),

    #[error("unknown format: {0}. Use markdown or json")]
    UnknownFormat(String),

    #[error("failed to serialize documentation: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DocError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = DocError::MissingFile(PathBuf::from("pkg/missing.py"));
        assert_eq!(err.to_string(), "file not found: pkg/missing.py");

        let err = DocError::io(
            "out/a.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to access out/a.md: denied");
    }
}
