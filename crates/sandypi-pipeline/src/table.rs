//! Table configuration: drawing-area geometry resolved from device settings.
//!
//! The physical table used by default is 514 × 620 mm with a 500 × 510 mm
//! safe drawing area starting at `Y = 50`. At rotation 0 the screen's
//! vertical axis (top → bottom) is machine X and the screen's horizontal
//! axis (left → right) is machine Y:
//!
//! ```text
//!   (X0,   Y50) ─────────── (X0,   Y560)
//!        │                        │
//!   (X500, Y50) ─────────── (X500, Y560)
//! ```
//!
//! Resolution never fails: every field falls back to its default
//! independently when the setting is missing or unusable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transform::canvas_to_machine;
use crate::types::{Bounds, CanvasSize, Point};

/// Screen rotation of the table, in 90° steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// Screen vertical is machine X, screen horizontal is machine Y.
    #[default]
    Deg0,
    /// Rotated a quarter turn.
    Deg90,
    /// Rotated a half turn.
    Deg180,
    /// Rotated three quarter turns.
    Deg270,
}

impl Rotation {
    /// All rotations in increasing order.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Map a degree value onto a rotation.
    ///
    /// Anything other than exactly 0, 90, 180 or 270 collapses to
    /// [`Rotation::Deg0`].
    #[must_use]
    pub const fn from_degrees(degrees: i64) -> Self {
        match degrees {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// The rotation in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Whether the screen axes are swapped relative to rotation 0.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Resolved drawing-area geometry.
///
/// Produced fresh by [`TableConfig::resolve`] for every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Extent of the drawing area along machine X (screen vertical).
    pub draw_width: f64,
    /// Extent of the drawing area along machine Y (screen horizontal).
    pub draw_height: f64,
    /// Machine X of the drawing area origin.
    pub offset_x: f64,
    /// Machine Y of the drawing area origin.
    pub offset_y: f64,
    /// Full physical X travel, for reference drawings.
    pub physical_width: f64,
    /// Full physical Y travel, for reference drawings.
    pub physical_height: f64,
    /// Screen rotation.
    pub rotation: Rotation,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            draw_width: Self::DEFAULT_DRAW_WIDTH,
            draw_height: Self::DEFAULT_DRAW_HEIGHT,
            offset_x: Self::DEFAULT_OFFSET_X,
            offset_y: Self::DEFAULT_OFFSET_Y,
            physical_width: Self::DEFAULT_PHYSICAL_WIDTH,
            physical_height: Self::DEFAULT_PHYSICAL_HEIGHT,
            rotation: Rotation::Deg0,
        }
    }
}

/// Machine coordinates of the four screen corners of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    /// Machine point under the top-left screen corner.
    pub top_left: Point,
    /// Machine point under the top-right screen corner.
    pub top_right: Point,
    /// Machine point under the bottom-left screen corner.
    pub bottom_left: Point,
    /// Machine point under the bottom-right screen corner.
    pub bottom_right: Point,
}

impl TableConfig {
    /// Default drawing-area extent along X.
    pub const DEFAULT_DRAW_WIDTH: f64 = 500.0;
    /// Default drawing-area extent along Y.
    pub const DEFAULT_DRAW_HEIGHT: f64 = 510.0;
    /// Default X offset.
    pub const DEFAULT_OFFSET_X: f64 = 0.0;
    /// Default Y offset.
    pub const DEFAULT_OFFSET_Y: f64 = 50.0;
    /// Default physical X travel.
    pub const DEFAULT_PHYSICAL_WIDTH: f64 = 514.0;
    /// Default physical Y travel.
    pub const DEFAULT_PHYSICAL_HEIGHT: f64 = 620.0;

    /// Resolve a table configuration from the persisted settings document.
    ///
    /// Reads `device.<key>` where each entry is either `{"value": ...}` or
    /// a bare number or numeric string. Dimensions must be positive and
    /// finite, offsets finite; anything else falls back to the default for
    /// that field alone.
    #[must_use]
    pub fn resolve(settings: &Value) -> Self {
        let device = settings.get("device");
        let read = |key: &str| device.and_then(|d| d.get(key)).and_then(setting_number);
        let positive = |key: &str, default: f64| read(key).filter(|v| *v > 0.0).unwrap_or(default);
        let offset = |key: &str, default: f64| read(key).unwrap_or(default);

        #[allow(clippy::cast_possible_truncation)]
        let rotation = read("canvas_rotation")
            .map_or(Rotation::Deg0, |deg| Rotation::from_degrees(deg.trunc() as i64));

        Self {
            draw_width: positive("width", Self::DEFAULT_DRAW_WIDTH),
            draw_height: positive("height", Self::DEFAULT_DRAW_HEIGHT),
            offset_x: offset("offset_x", Self::DEFAULT_OFFSET_X),
            offset_y: offset("offset_y", Self::DEFAULT_OFFSET_Y),
            physical_width: positive("physical_width", Self::DEFAULT_PHYSICAL_WIDTH),
            physical_height: positive("physical_height", Self::DEFAULT_PHYSICAL_HEIGHT),
            rotation,
        }
    }

    /// The safe drawing rectangle in machine coordinates.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.offset_x,
            max_x: self.offset_x + self.draw_width,
            min_y: self.offset_y,
            max_y: self.offset_y + self.draw_height,
        }
    }

    /// Largest on-screen box within `max_width` × `max_height` that keeps
    /// the table's visual aspect ratio.
    ///
    /// At rotation 0/180 the display width shows machine Y (`draw_height`)
    /// and the display height shows machine X (`draw_width`); 90/270 swap
    /// the roles. Results are rounded to whole pixels.
    #[must_use]
    pub fn display_size(&self, max_width: f64, max_height: f64) -> CanvasSize {
        let (aspect_w, aspect_h) = if self.rotation.swaps_axes() {
            (self.draw_width, self.draw_height)
        } else {
            (self.draw_height, self.draw_width)
        };
        let aspect = aspect_w / aspect_h;

        let (width, height) = if aspect >= 1.0 {
            let width = max_width.min(max_height * aspect);
            (width, width / aspect)
        } else {
            let height = max_height.min(max_width / aspect);
            (height * aspect, height)
        };

        CanvasSize::new(width.round(), height.round())
    }

    /// Machine coordinates under each screen corner.
    ///
    /// Derived by pushing the unit canvas corners through
    /// [`canvas_to_machine`], so labels always agree with the transform.
    #[must_use]
    pub fn corner_coordinates(&self) -> Corners {
        let unit = CanvasSize::new(1.0, 1.0);
        let corner = |x: f64, y: f64| canvas_to_machine(Point::new(x, y), unit, self);
        Corners {
            top_left: corner(0.0, 0.0),
            top_right: corner(1.0, 0.0),
            bottom_left: corner(0.0, 1.0),
            bottom_right: corner(1.0, 1.0),
        }
    }
}

/// Backing-store resolution for a display box at the given pixel ratio.
#[must_use]
pub fn internal_resolution(display: CanvasSize, scale_factor: f64) -> CanvasSize {
    CanvasSize::new(
        (display.width * scale_factor).round(),
        (display.height * scale_factor).round(),
    )
}

/// Format a machine coordinate as a corner label, e.g. `(X0, Y50)`.
#[must_use]
pub fn format_coordinate(p: Point) -> String {
    if p.is_break() {
        return "(Error)".to_string();
    }
    format!("(X{:.0}, Y{:.0})", p.x, p.y)
}

/// Extract a finite number from a settings entry.
fn setting_number(entry: &Value) -> Option<f64> {
    let raw = entry.get("value").unwrap_or(entry);
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}
