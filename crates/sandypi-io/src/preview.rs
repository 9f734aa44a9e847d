//! Fetching stored drawings for preview.

use serde::{Deserialize, Serialize};

use sandypi_export::{GcodePreview, parse_gcode};

use crate::api::DrawingsApi;
use crate::error::IoError;

/// What a preview surface should show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum PreviewState {
    /// Strokes ready to draw.
    Ready(GcodePreview),
    /// Inline error text; the stored drawing is untouched.
    Error(String),
}

impl PreviewState {
    /// Returns `true` for [`PreviewState::Ready`].
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Fetch drawing `id` and parse it into a preview.
///
/// # Errors
///
/// Returns an [`IoError`] if the fetch fails or the text holds no
/// moves.
pub fn load_preview<A: DrawingsApi>(api: &A, id: u64) -> Result<GcodePreview, IoError> {
    let text = api.fetch_gcode(id)?;
    Ok(parse_gcode(&text)?)
}

/// Like [`load_preview`], folding any failure into
/// [`PreviewState::Error`].
pub fn fetch_for_preview<A: DrawingsApi>(api: &A, id: u64) -> PreviewState {
    match load_preview(api, id) {
        Ok(preview) => PreviewState::Ready(preview),
        Err(err) => {
            log::warn!("preview of drawing {id} failed: {err}");
            PreviewState::Error(err.to_string())
        }
    }
}
