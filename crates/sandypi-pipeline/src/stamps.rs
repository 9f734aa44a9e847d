//! Stamp shapes for the canvas drawing tool.
//!
//! Stamps are centered on the origin in canvas convention (+Y down) and
//! placed by the caller. Closed shapes repeat their first vertex.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::types::{Point, Polyline};

/// A stamp shape and its size parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Stamp {
    /// Horizontal segment.
    Line {
        /// Total length.
        length: f64,
    },
    /// Axis-aligned square.
    Square {
        /// Side length.
        size: f64,
    },
    /// Equilateral triangle, apex up, centroid at the origin.
    Triangle {
        /// Side length.
        size: f64,
    },
    /// Circle approximated by `segments` chords.
    Circle {
        /// Radius.
        radius: f64,
        /// Number of chords.
        segments: u32,
    },
    /// Star with alternating tip and notch radii.
    Star {
        /// Tip radius.
        outer_radius: f64,
        /// Notch radius.
        inner_radius: f64,
        /// Number of tips.
        points: u32,
    },
}

impl Stamp {
    /// Generate the stamp outline.
    #[must_use]
    pub fn points(&self) -> Polyline {
        match *self {
            Self::Line { length } => line(length),
            Self::Square { size } => square(size),
            Self::Triangle { size } => triangle(size),
            Self::Circle { radius, segments } => circle(radius, segments),
            Self::Star {
                outer_radius,
                inner_radius,
                points,
            } => star(outer_radius, inner_radius, points),
        }
    }

    /// Generate the outline translated so its center sits at `at`.
    #[must_use]
    pub fn place(&self, at: Point) -> Polyline {
        self.points()
            .points()
            .iter()
            .map(|p| Point::new(p.x + at.x, p.y + at.y))
            .collect()
    }
}

/// Horizontal segment centered on the origin.
#[must_use]
pub fn line(length: f64) -> Polyline {
    let half = length / 2.0;
    Polyline::new(vec![Point::new(-half, 0.0), Point::new(half, 0.0)])
}

/// Closed square centered on the origin.
#[must_use]
pub fn square(size: f64) -> Polyline {
    let half = size / 2.0;
    Polyline::new(vec![
        Point::new(-half, -half),
        Point::new(half, -half),
        Point::new(half, half),
        Point::new(-half, half),
        Point::new(-half, -half),
    ])
}

/// Closed equilateral triangle with its centroid at the origin.
#[must_use]
pub fn triangle(size: f64) -> Polyline {
    let height = size * 3.0_f64.sqrt() / 2.0;
    let top = Point::new(0.0, -height * 2.0 / 3.0);
    let bottom_y = height / 3.0;
    Polyline::new(vec![
        top,
        Point::new(size / 2.0, bottom_y),
        Point::new(-size / 2.0, bottom_y),
        top,
    ])
}

/// Closed circle with `segments + 1` points.
#[must_use]
pub fn circle(radius: f64, segments: u32) -> Polyline {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let theta = f64::from(i) / f64::from(segments) * TAU;
            Point::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Star starting at the top tip.
#[must_use]
pub fn star(outer_radius: f64, inner_radius: f64, points: u32) -> Polyline {
    let points = points.max(2);
    let step = PI / f64::from(points);
    (0..=2 * points)
        .map(|i| {
            let r = if i % 2 == 0 { outer_radius } else { inner_radius };
            let theta = f64::from(i).mul_add(step, -FRAC_PI_2);
            Point::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}
