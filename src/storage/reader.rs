//! Cassette file reader

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use super::{CassetteDocument, Format};
use crate::Result;

/// Read and decode a cassette file
///
/// Returns `Ok(None)` when the file does not exist. An empty or
/// whitespace-only file reads as a document with no interactions.
///
/// # Errors
///
/// Returns error if the file cannot be read or decoded
pub fn read_document(path: &Path, format: Format) -> Result<Option<CassetteDocument>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No cassette at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if text.trim().is_empty() {
        return Ok(Some(CassetteDocument {
            http_interactions: Vec::new(),
            recorded_with: None,
        }));
    }

    format.decode(&text).map(Some)
}
