//! Kaleidoscope symmetry for center-normalized strokes.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::types::{Point, Polyline};

/// How each rotational copy is mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorMode {
    /// Rotational copies only.
    #[default]
    Radial,
    /// Each rotational copy is paired with its reflection across the
    /// segment's leading ray.
    Bilateral,
}

/// Replicate `paths` into `segments` rotational copies about the origin.
///
/// Output order is segment by segment, each segment holding every input
/// path (followed by its reflection in [`MirrorMode::Bilateral`]).
#[must_use]
pub fn kaleidoscope(paths: &[Polyline], segments: u32, mirror: MirrorMode) -> Vec<Polyline> {
    let segments = segments.max(1);
    let segment_angle = TAU / f64::from(segments);

    let mut out = Vec::new();
    for seg in 0..segments {
        let base = f64::from(seg) * segment_angle;
        for path in paths {
            out.push(map_points(path, |angle| angle + base));
            if mirror == MirrorMode::Bilateral {
                out.push(map_points(path, |angle| base - angle));
            }
        }
    }
    out
}

fn map_points(path: &Polyline, angle_map: impl Fn(f64) -> f64) -> Polyline {
    path.points()
        .iter()
        .map(|&p| {
            if p.is_break() {
                return p;
            }
            let radius = p.x.hypot(p.y);
            let angle = angle_map(p.y.atan2(p.x));
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
