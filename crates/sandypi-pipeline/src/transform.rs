//! Authoring-space to machine-space coordinate transforms.
//!
//! Every drawing tool authors points in one of the [`CoordinateSpace`]s.
//! Before serialization the points are mapped into machine space, the
//! millimeter coordinate system of the table's safe drawing area.
//!
//! The canvas transform first normalizes a pixel position to
//! `(nx, ny) ∈ [0, 1]²`, then applies a rotation table to obtain the
//! fraction of the drawing area along machine X (`gx`) and Y (`gy`):
//!
//! ```text
//! rotation   gx        gy
//!   0°       ny        nx
//!  90°       nx        1 - ny
//! 180°       1 - ny    1 - nx
//! 270°       1 - nx    ny
//!
//! X = gx × draw_width  + offset_x
//! Y = gy × draw_height + offset_y
//! ```
//!
//! Pen-up markers pass through every transform unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clip::clip_polyline;
use crate::table::{Rotation, TableConfig};
use crate::types::{CanvasSize, Point, Polyline};

/// The coordinate system a path was authored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CoordinateSpace {
    /// Pixels of a canvas of the given size, origin top-left, +Y down.
    Canvas {
        /// Canvas width in pixels.
        width: f64,
        /// Canvas height in pixels.
        height: f64,
    },
    /// `[-1, 1]²` with the origin at the canvas center, +Y up.
    CenterNormalized,
    /// `[-1, 1]²` mapped onto the largest centered square of the drawing
    /// area, with machine X/Y taken directly from x/y.
    PatternBuilder,
    /// Already in machine units.
    PreTransformed,
}

impl CoordinateSpace {
    /// Tag used in the G-code type marker comment.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Canvas { .. } => "CANVAS",
            Self::CenterNormalized => "CENTER-NORMALIZED",
            Self::PatternBuilder => "PATTERN-BUILDER",
            Self::PreTransformed => "PRE-TRANSFORMED",
        }
    }
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Scale, rotation (degrees) and translation applied to a pattern-builder
/// layer, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerTransform {
    /// Uniform scale factor.
    pub scale: f64,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
    /// Translation along x after rotation.
    pub offset_x: f64,
    /// Translation along y after rotation.
    pub offset_y: f64,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            scale: 0.8,
            rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Map one point from `space` into machine space.
#[must_use]
pub fn to_machine(p: Point, space: CoordinateSpace, config: &TableConfig) -> Point {
    if p.is_break() {
        return p;
    }
    match space {
        CoordinateSpace::Canvas { width, height } => {
            canvas_to_machine(p, CanvasSize::new(width, height), config)
        }
        CoordinateSpace::CenterNormalized => {
            let unit = Point::new(f64::midpoint(p.x, 1.0), (1.0 - p.y) / 2.0);
            canvas_to_machine(unit, CanvasSize::new(1.0, 1.0), config)
        }
        CoordinateSpace::PatternBuilder => {
            let half = config.draw_width.min(config.draw_height) / 2.0;
            Point::new(
                p.x.mul_add(half, config.draw_width / 2.0) + config.offset_x,
                p.y.mul_add(half, config.draw_height / 2.0) + config.offset_y,
            )
        }
        CoordinateSpace::PreTransformed => p,
    }
}

/// Map a canvas pixel position into machine space.
#[must_use]
pub fn canvas_to_machine(p: Point, canvas: CanvasSize, config: &TableConfig) -> Point {
    if p.is_break() {
        return p;
    }
    let nx = p.x / canvas.width;
    let ny = p.y / canvas.height;
    let (gx, gy) = match config.rotation {
        Rotation::Deg0 => (ny, nx),
        Rotation::Deg90 => (nx, 1.0 - ny),
        Rotation::Deg180 => (1.0 - ny, 1.0 - nx),
        Rotation::Deg270 => (1.0 - nx, ny),
    };
    Point::new(
        gx.mul_add(config.draw_width, config.offset_x),
        gy.mul_add(config.draw_height, config.offset_y),
    )
}

/// Map a machine-space point back onto a canvas.
///
/// Exact inverse of [`canvas_to_machine`] for the same canvas and config.
#[must_use]
pub fn to_canvas(p: Point, config: &TableConfig, canvas: CanvasSize) -> Point {
    if p.is_break() {
        return p;
    }
    let gx = (p.x - config.offset_x) / config.draw_width;
    let gy = (p.y - config.offset_y) / config.draw_height;
    let (nx, ny) = match config.rotation {
        Rotation::Deg0 => (gy, gx),
        Rotation::Deg90 => (gx, 1.0 - gy),
        Rotation::Deg180 => (1.0 - gy, 1.0 - gx),
        Rotation::Deg270 => (1.0 - gx, gy),
    };
    Point::new(nx * canvas.width, ny * canvas.height)
}

/// Transform every path into machine space, optionally clipping each one
/// to the drawing area.
#[must_use]
pub fn to_machine_paths(
    paths: &[Polyline],
    space: CoordinateSpace,
    config: &TableConfig,
    clip: bool,
) -> Vec<Polyline> {
    let bounds = config.bounds();
    paths
        .iter()
        .map(|path| {
            let machine: Polyline = path
                .points()
                .iter()
                .map(|&p| to_machine(p, space, config))
                .collect();
            if clip {
                clip_polyline(&machine, &bounds)
            } else {
                machine
            }
        })
        .collect()
}

/// Apply a layer transform: scale, then rotate, then translate.
#[must_use]
pub fn transform_points(polyline: &Polyline, transform: &LayerTransform) -> Polyline {
    let (sin, cos) = transform.rotation.to_radians().sin_cos();
    polyline
        .points()
        .iter()
        .map(|&p| {
            if p.is_break() {
                return p;
            }
            let x = p.x * transform.scale;
            let y = p.y * transform.scale;
            Point::new(
                x.mul_add(cos, -(y * sin)) + transform.offset_x,
                x.mul_add(sin, y * cos) + transform.offset_y,
            )
        })
        .collect()
}

/// Clamp a machine-space point onto the drawing area.
#[must_use]
pub fn clamp_to_drawing_area(p: Point, config: &TableConfig) -> Point {
    if p.is_break() {
        return p;
    }
    config.bounds().clamp(p)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(p: Point, x: f64, y: f64) -> bool {
        (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9
    }

    fn rotated(rotation: Rotation) -> TableConfig {
        TableConfig {
            rotation,
            ..TableConfig::default()
        }
    }

    const CANVAS: CoordinateSpace = CoordinateSpace::Canvas {
        width: 500.0,
        height: 510.0,
    };

    #[test]
    fn canvas_corners_map_to_drawing_area_corners() {
        let config = TableConfig::default();
        assert!(close(to_machine(Point::new(0.0, 0.0), CANVAS, &config), 0.0, 50.0));
        assert!(close(
            to_machine(Point::new(500.0, 510.0), CANVAS, &config),
            500.0,
            560.0
        ));
    }

    #[test]
    fn canvas_axes_are_swapped_at_rotation_zero() {
        // Moving right on screen moves along machine Y.
        let config = TableConfig::default();
        let p = to_machine(Point::new(250.0, 0.0), CANVAS, &config);
        assert!(close(p, 0.0, 305.0));
    }

    #[test]
    fn canvas_round_trip_for_every_rotation() {
        let canvas = CanvasSize::new(640.0, 480.0);
        let samples = [
            Point::new(0.0, 0.0),
            Point::new(123.4, 56.7),
            Point::new(640.0, 480.0),
            Point::new(320.0, 10.0),
        ];
        for rotation in Rotation::ALL {
            let config = rotated(rotation);
            for p in samples {
                let back = to_canvas(canvas_to_machine(p, canvas, &config), &config, canvas);
                assert!(close(back, p.x, p.y), "{rotation:?}: {p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn unit_corners_agree_with_corner_labels() {
        let unit = CanvasSize::new(1.0, 1.0);
        for rotation in Rotation::ALL {
            let config = rotated(rotation);
            let corners = config.corner_coordinates();
            let bottom_right = canvas_to_machine(Point::new(1.0, 1.0), unit, &config);
            assert_eq!(bottom_right, corners.bottom_right, "{rotation:?}");
            let top_left = canvas_to_machine(Point::new(0.0, 0.0), unit, &config);
            assert_eq!(top_left, corners.top_left, "{rotation:?}");
        }
    }

    #[test]
    fn rotations_map_top_left_to_distinct_corners() {
        let origin = Point::new(0.0, 0.0);
        let got: Vec<Point> = Rotation::ALL
            .iter()
            .map(|&r| canvas_to_machine(origin, CanvasSize::new(1.0, 1.0), &rotated(r)))
            .collect();
        assert!(close(got[0], 0.0, 50.0));
        assert!(close(got[1], 0.0, 560.0));
        assert!(close(got[2], 500.0, 560.0));
        assert!(close(got[3], 500.0, 50.0));
    }

    #[test]
    fn center_normalized_origin_is_drawing_center() {
        let config = TableConfig::default();
        let p = to_machine(Point::new(0.0, 0.0), CoordinateSpace::CenterNormalized, &config);
        assert!(close(p, 250.0, 305.0));
        // Top of the screen (y = 1) is machine X = 0 at rotation 0.
        let top = to_machine(Point::new(0.0, 1.0), CoordinateSpace::CenterNormalized, &config);
        assert!(close(top, 0.0, 305.0));
    }

    #[test]
    fn pattern_builder_uses_centered_square() {
        let config = TableConfig::default();
        let center = to_machine(Point::new(0.0, 0.0), CoordinateSpace::PatternBuilder, &config);
        assert!(close(center, 250.0, 305.0));
        let corner = to_machine(Point::new(1.0, -1.0), CoordinateSpace::PatternBuilder, &config);
        assert!(close(corner, 500.0, 55.0));
    }

    #[test]
    fn pre_transformed_and_breaks_pass_through() {
        let config = rotated(Rotation::Deg180);
        let p = Point::new(12.0, 34.0);
        assert_eq!(to_machine(p, CoordinateSpace::PreTransformed, &config), p);
        assert!(to_machine(Point::pen_up(), CANVAS, &config).is_break());
    }

    #[test]
    fn to_machine_paths_clips_when_asked() {
        let config = TableConfig::default();
        let path = Polyline::new(vec![Point::new(-10.0, 100.0), Point::new(100.0, 100.0)]);
        let raw = to_machine_paths(
            std::slice::from_ref(&path),
            CoordinateSpace::PreTransformed,
            &config,
            false,
        );
        assert_eq!(raw[0], path);

        let clipped = to_machine_paths(&[path], CoordinateSpace::PreTransformed, &config, true);
        let bounds = config.bounds();
        assert!(clipped[0].points().iter().all(|&p| bounds.contains(p)));
    }

    #[test]
    fn layer_transform_scales_rotates_translates() {
        let transform = LayerTransform {
            scale: 2.0,
            rotation: 90.0,
            offset_x: 1.0,
            offset_y: 0.0,
        };
        let out = transform_points(&Polyline::new(vec![Point::new(1.0, 0.0)]), &transform);
        assert!(close(out.points()[0], 1.0, 2.0));
    }

    #[test]
    fn layer_transform_keeps_breaks() {
        let path = Polyline::new(vec![Point::new(1.0, 0.0), Point::pen_up(), Point::new(0.0, 1.0)]);
        let out = transform_points(&path, &LayerTransform::default());
        assert_eq!(out.len(), 3);
        assert!(out.points()[1].is_break());
    }

    #[test]
    fn clamp_to_drawing_area_snaps_outside_points() {
        let config = TableConfig::default();
        let p = clamp_to_drawing_area(Point::new(600.0, 0.0), &config);
        assert!(close(p, 500.0, 50.0));
    }

    #[test]
    fn space_tags() {
        assert_eq!(CANVAS.tag(), "CANVAS");
        assert_eq!(CoordinateSpace::PatternBuilder.to_string(), "PATTERN-BUILDER");
    }
}
