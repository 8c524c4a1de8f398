//! Fixture file generation.

use mkharness_core::{HarnessError, Result};
use std::path::{Path, PathBuf};

/// Create `directory/filename` containing the file's base name and a newline.
///
/// Parent directories are not created. Returns the path written.
pub fn create_fixture(filename: impl AsRef<Path>, directory: impl AsRef<Path>) -> Result<PathBuf> {
    let filename = filename.as_ref();
    let path = directory.as_ref().join(filename);
    let base = filename
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    std::fs::write(&path, format!("{base}\n"))
        .map_err(|e| HarnessError::io(format!("failed to write fixture {}", path.display()), e))?;
    Ok(path)
}
