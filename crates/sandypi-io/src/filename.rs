//! Drawing file names.

/// Extension every uploaded or downloaded drawing carries.
pub const GCODE_EXTENSION: &str = ".gcode";

/// Prefix of generated names when the user gave none.
pub const DEFAULT_PREFIX: &str = "drawing";

/// Turn a user-entered name into a drawing file name.
///
/// Surrounding whitespace is trimmed.  An empty name becomes
/// `<prefix>_<timestamp_millis>`.  `.gcode` is appended unless the name
/// already ends with it (in any case).
///
/// # Examples
///
/// ```
/// use sandypi_io::normalize_filename;
///
/// assert_eq!(normalize_filename("  waves ", "drawing", 0), "waves.gcode");
/// assert_eq!(normalize_filename("WAVES.GCODE", "drawing", 0), "WAVES.GCODE");
/// assert_eq!(normalize_filename("", "pattern", 1_700_000_000_000), "pattern_1700000000000.gcode");
/// ```
#[must_use]
pub fn normalize_filename(name: &str, prefix: &str, timestamp_millis: i64) -> String {
    let trimmed = name.trim();
    let mut filename = if trimmed.is_empty() {
        format!("{prefix}_{timestamp_millis}")
    } else {
        trimmed.to_owned()
    };
    if !filename.to_ascii_lowercase().ends_with(GCODE_EXTENSION) {
        filename.push_str(GCODE_EXTENSION);
    }
    filename
}

/// [`normalize_filename`] stamped with the current time.
#[must_use]
pub fn normalize_filename_now(name: &str, prefix: &str) -> String {
    normalize_filename(name, prefix, chrono::Utc::now().timestamp_millis())
}
