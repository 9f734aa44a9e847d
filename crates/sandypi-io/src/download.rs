//! Saving G-code to a local file.

use std::path::{Path, PathBuf};

use crate::error::IoError;
use crate::filename::{DEFAULT_PREFIX, normalize_filename_now};

/// Write `gcode` into `dir` under the normalized form of `filename`.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns [`IoError::Write`] if the file cannot be written.
pub fn download(gcode: &str, filename: &str, dir: &Path) -> Result<PathBuf, IoError> {
    let path = dir.join(normalize_filename_now(filename, DEFAULT_PREFIX));
    std::fs::write(&path, gcode).map_err(|source| IoError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!("saved {} ({} bytes)", path.display(), gcode.len());
    Ok(path)
}
