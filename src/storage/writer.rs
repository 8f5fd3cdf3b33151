//! Cassette file writer

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{CassetteDocument, Format};
use crate::{Result, TapedeckError};

/// Encode and write a cassette file in one atomic replace
///
/// The document is written to a temporary file in the destination
/// directory and renamed over `path`, so readers never see a partial file.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns error if encoding fails or the file cannot be written
pub fn write_document(path: &Path, format: Format, document: &CassetteDocument) -> Result<()> {
    let text = format.encode(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path)
        .map_err(|e| TapedeckError::Io(e.error))?;

    debug!(
        "Wrote {} interactions to {}",
        document.http_interactions.len(),
        path.display()
    );

    Ok(())
}
