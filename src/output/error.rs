//! Error types for reading the CV and writing the JSON output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading input or saving output.
#[derive(Debug, Error)]
pub enum CvError {
    /// The input document does not exist.
    #[error("input file not found: {path}\n  Suggestion: pass the path to your CV .tex file")]
    InputNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The input exists but could not be read (permissions, invalid UTF-8).
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the output directory or writing the file failed.
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be encoded as JSON.
    #[error("could not serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CvError {
    /// Returns true for the missing-input case the CLI reports specially.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }
}
