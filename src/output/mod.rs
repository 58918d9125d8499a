//! Reading the CV document and writing the extracted JSON.
//!
//! Output is pretty-printed UTF-8 with non-ASCII characters kept as-is.

mod error;

pub use error::CvError;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::record::CvDocument;

/// Reads the whole input document.
///
/// # Errors
///
/// Returns [`CvError::InputNotFound`] when the path does not exist and
/// [`CvError::Read`] for any other I/O or encoding failure.
pub fn read_document(path: &Path) -> Result<String, CvError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), bytes = text.len(), "Read input document");
            Ok(text)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(CvError::InputNotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CvError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Serializes the document as indented JSON.
///
/// # Errors
///
/// Returns [`CvError::Serialize`] if encoding fails.
pub fn to_json(document: &CvDocument) -> Result<String, CvError> {
    let mut json = serde_json::to_string_pretty(document)?;
    json.push('\n');
    Ok(json)
}

/// Writes the document to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`CvError::Write`] if the directory or file cannot be written.
pub fn write_document(document: &CvDocument, path: &Path) -> Result<(), CvError> {
    let json = to_json(document)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| CvError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, json).map_err(|source| CvError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), records = document.len(), "Wrote JSON output");
    Ok(())
}
