//! Rectangular boundary clipping with perimeter tracing.
//!
//! A sand table cannot lift its ball, so a path that leaves the safe
//! drawing area cannot simply be cut: the ball still has to travel from
//! where the path left to where it comes back. Instead of splitting the
//! polyline, the portion outside the rectangle is replaced by a walk along
//! the rectangle's perimeter from the exit point, around any corners, to
//! the re-entry point.
//!
//! Edges are walked in the cyclic order top, right, bottom, left
//! (clockwise). The shorter rotational direction wins; when both
//! directions pass the same number of corners the shorter perimeter
//! distance wins, and an exact tie goes clockwise.
//!
//! Every non-break point of the output lies inside or on the rectangle.
//! Clipping an already clipped path returns it unchanged.

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, Point, Polyline};

/// One side of the drawing rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// `y = max_y`.
    Top,
    /// `x = max_x`.
    Right,
    /// `y = min_y`.
    Bottom,
    /// `x = min_x`.
    Left,
}

impl Edge {
    const CLOCKWISE: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Left => 3,
        }
    }

    /// The corner shared with the next edge clockwise.
    const fn clockwise_corner(self, bounds: &Bounds) -> Point {
        match self {
            Self::Top => Point::new(bounds.max_x, bounds.max_y),
            Self::Right => Point::new(bounds.max_x, bounds.min_y),
            Self::Bottom => Point::new(bounds.min_x, bounds.min_y),
            Self::Left => Point::new(bounds.min_x, bounds.max_y),
        }
    }

    /// The edge nearest to `p`.
    fn nearest(p: Point, bounds: &Bounds) -> Self {
        let distances = [
            (Self::Top, (bounds.max_y - p.y).abs()),
            (Self::Right, (bounds.max_x - p.x).abs()),
            (Self::Bottom, (p.y - bounds.min_y).abs()),
            (Self::Left, (p.x - bounds.min_x).abs()),
        ];
        distances
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(Self::Top, |(edge, _)| edge)
    }
}

/// A point where a segment crosses the rectangle, tagged with the edge it
/// crosses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryHit {
    /// Crossing point, snapped onto the rectangle.
    pub point: Point,
    /// Edge the crossing lies on.
    pub edge: Edge,
}

impl BoundaryHit {
    fn snapped(p: Point, bounds: &Bounds) -> Self {
        let point = bounds.clamp(p);
        Self {
            point,
            edge: Edge::nearest(point, bounds),
        }
    }
}

/// Returns `true` if the point is drawable and lies inside or on the
/// rectangle.
#[must_use]
pub fn is_inside_boundary(p: Point, bounds: &Bounds) -> bool {
    bounds.contains(p)
}

/// Clamp a point onto the rectangle. Pen-up markers are returned as-is.
#[must_use]
pub fn clamp_to_boundary(p: Point, bounds: &Bounds) -> Point {
    if p.is_break() { p } else { bounds.clamp(p) }
}

/// Where the segment from `inside` to `outside` leaves the rectangle.
#[must_use]
pub fn exit_intersection(inside: Point, outside: Point, bounds: &Bounds) -> Option<BoundaryHit> {
    let crossing = liang_barsky(inside, outside, bounds)?;
    let edge = crossing.exit_edge?;
    Some(BoundaryHit {
        point: bounds.clamp(lerp(inside, outside, crossing.t_exit)),
        edge,
    })
}

/// Where the segment from `outside` to `inside` enters the rectangle.
#[must_use]
pub fn entry_intersection(outside: Point, inside: Point, bounds: &Bounds) -> Option<BoundaryHit> {
    let crossing = liang_barsky(outside, inside, bounds)?;
    let edge = crossing.entry_edge?;
    Some(BoundaryHit {
        point: bounds.clamp(lerp(outside, inside, crossing.t_entry)),
        edge,
    })
}

/// Corners visited when walking the perimeter from `exit` to `entry`.
///
/// The exit and entry points themselves are not included. Both hits on
/// the same edge need no corners.
#[must_use]
pub fn trace_boundary(exit: BoundaryHit, entry: BoundaryHit, bounds: &Bounds) -> Vec<Point> {
    let from = exit.edge.index();
    let to = entry.edge.index();
    let cw_steps = (to + 4 - from) % 4;
    let ccw_steps = (from + 4 - to) % 4;

    let clockwise: Vec<Point> = (0..cw_steps)
        .map(|k| Edge::CLOCKWISE[(from + k) % 4].clockwise_corner(bounds))
        .collect();
    let counter_clockwise: Vec<Point> = (0..ccw_steps)
        .map(|k| Edge::CLOCKWISE[(from + 3 * (k + 1)) % 4].clockwise_corner(bounds))
        .collect();

    if cw_steps < ccw_steps {
        return clockwise;
    }
    if ccw_steps < cw_steps {
        return counter_clockwise;
    }
    let cw_len = walk_length(exit.point, &clockwise, entry.point);
    let ccw_len = walk_length(exit.point, &counter_clockwise, entry.point);
    if ccw_len < cw_len {
        counter_clockwise
    } else {
        clockwise
    }
}

/// Clip a machine-space polyline to `bounds`, replacing excursions
/// outside the rectangle with perimeter traces.
#[must_use = "returns the clipped polyline"]
pub fn clip_polyline(path: &Polyline, bounds: &Bounds) -> Polyline {
    let points = path.points();
    let reentry = reentry_indices(points, bounds);
    let mut out = Emitter::new(*bounds, points.len());

    let mut prev: Option<Point> = None;
    let mut i = 0;
    while i < points.len() {
        let p = points[i];
        if p.is_break() {
            out.push_original(p);
            prev = None;
            i += 1;
            continue;
        }
        let inside = bounds.contains(p);

        let Some(a) = prev else {
            if inside {
                out.push_original(p);
            } else {
                out.push_synthesized(p);
            }
            prev = Some(p);
            i += 1;
            continue;
        };

        match (bounds.contains(a), inside) {
            (true, true) => out.push_original(p),
            (true, false) => {
                let exit = exit_intersection(a, p, bounds)
                    .unwrap_or_else(|| BoundaryHit::snapped(p, bounds));
                out.push_synthesized(exit.point);

                if let Some(j) = reentry[i] {
                    let target = points[j];
                    let entry = entry_intersection(points[j - 1], target, bounds)
                        .unwrap_or_else(|| BoundaryHit::snapped(target, bounds));
                    for corner in trace_boundary(exit, entry, bounds) {
                        out.push_synthesized(corner);
                    }
                    if entry.point != target {
                        out.push_synthesized(entry.point);
                    }
                    out.push_original(target);
                    prev = Some(target);
                    i = j + 1;
                    continue;
                }
                out.push_synthesized(p);
            }
            (false, true) => {
                if let Some(entry) = entry_intersection(a, p, bounds)
                    && entry.point != p
                {
                    out.push_synthesized(entry.point);
                }
                out.push_original(p);
            }
            (false, false) => {
                if let Some(crossing) = liang_barsky(a, p, bounds)
                    && crossing.t_entry < crossing.t_exit
                {
                    out.push_synthesized(lerp(a, p, crossing.t_entry));
                    out.push_synthesized(lerp(a, p, crossing.t_exit));
                }
                if reentry[i].is_none() {
                    out.push_synthesized(p);
                }
            }
        }
        prev = Some(p);
        i += 1;
    }

    Polyline::new(out.finish())
}

/// Clip every polyline independently.
#[must_use = "returns the clipped polylines"]
pub fn clip_polylines(paths: &[Polyline], bounds: &Bounds) -> Vec<Polyline> {
    paths.iter().map(|path| clip_polyline(path, bounds)).collect()
}

/// Output buffer that snaps synthesized points onto the rectangle and
/// drops them when they repeat the previous point.
struct Emitter {
    bounds: Bounds,
    points: Vec<Point>,
}

impl Emitter {
    fn new(bounds: Bounds, capacity: usize) -> Self {
        Self {
            bounds,
            points: Vec::with_capacity(capacity),
        }
    }

    fn push_original(&mut self, p: Point) {
        self.points.push(p);
    }

    fn push_synthesized(&mut self, p: Point) {
        let snapped = self.bounds.clamp(p);
        if self.points.last() != Some(&snapped) {
            self.points.push(snapped);
        }
    }

    fn finish(self) -> Vec<Point> {
        self.points
    }
}

/// For each index, the first later index holding an inside point before
/// the next pen-up marker.
fn reentry_indices(points: &[Point], bounds: &Bounds) -> Vec<Option<usize>> {
    let mut result = vec![None; points.len()];
    let mut next = None;
    for (i, &p) in points.iter().enumerate().rev() {
        result[i] = next;
        if p.is_break() {
            next = None;
        } else if bounds.contains(p) {
            next = Some(i);
        }
    }
    result
}

/// Parametric crossing of a segment with the rectangle.
struct Crossing {
    t_entry: f64,
    entry_edge: Option<Edge>,
    t_exit: f64,
    exit_edge: Option<Edge>,
}

/// Liang–Barsky segment clipping. `None` when the segment misses the
/// rectangle entirely.
fn liang_barsky(a: Point, b: Point, bounds: &Bounds) -> Option<Crossing> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let constraints = [
        (-dx, a.x - bounds.min_x, Edge::Left),
        (dx, bounds.max_x - a.x, Edge::Right),
        (-dy, a.y - bounds.min_y, Edge::Bottom),
        (dy, bounds.max_y - a.y, Edge::Top),
    ];

    let mut crossing = Crossing {
        t_entry: 0.0,
        entry_edge: None,
        t_exit: 1.0,
        exit_edge: None,
    };
    for (p, q, edge) in constraints {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > crossing.t_exit {
                return None;
            }
            if r > crossing.t_entry {
                crossing.t_entry = r;
                crossing.entry_edge = Some(edge);
            }
        } else {
            if r < crossing.t_entry {
                return None;
            }
            if r < crossing.t_exit {
                crossing.t_exit = r;
                crossing.exit_edge = Some(edge);
            }
        }
    }
    Some(crossing)
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(t.mul_add(b.x - a.x, a.x), t.mul_add(b.y - a.y, a.y))
}

fn walk_length(start: Point, corners: &[Point], end: Point) -> f64 {
    let mut length = 0.0;
    let mut last = start;
    for &c in corners.iter().chain(std::iter::once(&end)) {
        length += last.distance(c);
        last = c;
    }
    length
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds {
        min_x: 0.0,
        max_x: 100.0,
        min_y: 0.0,
        max_y: 100.0,
    };

    fn pl(coords: &[(f64, f64)]) -> Polyline {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn assert_points(actual: &Polyline, expected: &[(f64, f64)]) {
        assert_eq!(
            actual.len(),
            expected.len(),
            "length mismatch: {actual:?} vs {expected:?}"
        );
        for (p, &(x, y)) in actual.points().iter().zip(expected) {
            assert!(
                (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
                "{p:?} != ({x}, {y}) in {actual:?}"
            );
        }
    }

    fn all_inside(path: &Polyline) -> bool {
        path.points()
            .iter()
            .all(|&p| p.is_break() || BOUNDS.contains(p))
    }

    #[test]
    fn inside_path_is_unchanged() {
        let path = pl(&[(10.0, 10.0), (50.0, 50.0), (90.0, 20.0)]);
        assert_eq!(clip_polyline(&path, &BOUNDS), path);
    }

    #[test]
    fn path_on_edges_is_unchanged() {
        let path = pl(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
        assert_eq!(clip_polyline(&path, &BOUNDS), path);
    }

    #[test]
    fn stroke_entering_from_the_left() {
        let path = pl(&[(-10.0, 5.0), (10.0, 5.0)]);
        assert_points(&clip_polyline(&path, &BOUNDS), &[(0.0, 5.0), (10.0, 5.0)]);
    }

    #[test]
    fn excursion_traces_through_one_corner() {
        let path = pl(&[(50.0, 90.0), (50.0, 150.0), (150.0, 150.0), (90.0, 50.0)]);
        let clipped = clip_polyline(&path, &BOUNDS);
        assert_points(
            &clipped,
            &[
                (50.0, 90.0),
                (50.0, 100.0),
                (100.0, 100.0),
                (100.0, 150.0 - 100.0 * 50.0 / 60.0),
                (90.0, 50.0),
            ],
        );
    }

    #[test]
    fn opposite_edges_tie_goes_clockwise() {
        let path = pl(&[(50.0, 90.0), (50.0, 150.0), (50.0, -50.0), (50.0, 10.0)]);
        assert_points(
            &clip_polyline(&path, &BOUNDS),
            &[
                (50.0, 90.0),
                (50.0, 100.0),
                (100.0, 100.0),
                (100.0, 0.0),
                (50.0, 0.0),
                (50.0, 10.0),
            ],
        );
    }

    #[test]
    fn opposite_edges_take_shorter_perimeter() {
        let path = pl(&[(20.0, 90.0), (20.0, 150.0), (20.0, -50.0), (20.0, 10.0)]);
        assert_points(
            &clip_polyline(&path, &BOUNDS),
            &[
                (20.0, 90.0),
                (20.0, 100.0),
                (0.0, 100.0),
                (0.0, 0.0),
                (20.0, 0.0),
                (20.0, 10.0),
            ],
        );
    }

    #[test]
    fn exit_without_return_clamps() {
        let path = pl(&[(50.0, 50.0), (150.0, 50.0), (150.0, 80.0)]);
        assert_points(
            &clip_polyline(&path, &BOUNDS),
            &[(50.0, 50.0), (100.0, 50.0), (100.0, 80.0)],
        );
    }

    #[test]
    fn segment_passing_through_emits_entry_and_exit() {
        let path = pl(&[(-50.0, 50.0), (150.0, 50.0)]);
        assert_points(
            &clip_polyline(&path, &BOUNDS),
            &[(0.0, 50.0), (100.0, 50.0)],
        );
    }

    #[test]
    fn fully_outside_path_is_clamped_onto_boundary() {
        let path = pl(&[(-20.0, -20.0), (-20.0, 50.0), (-20.0, 120.0)]);
        let clipped = clip_polyline(&path, &BOUNDS);
        assert_points(&clipped, &[(0.0, 0.0), (0.0, 50.0), (0.0, 100.0)]);
    }

    #[test]
    fn breaks_reset_tracking_and_pass_through() {
        let path = Polyline::new(vec![
            Point::new(50.0, 50.0),
            Point::new(150.0, 50.0),
            Point::pen_up(),
            Point::new(60.0, 60.0),
        ]);
        let clipped = clip_polyline(&path, &BOUNDS);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.points()[2].is_break());
        assert_eq!(clipped.points()[3], Point::new(60.0, 60.0));
    }

    #[test]
    fn inside_path_with_break_is_unchanged() {
        let path = Polyline::new(vec![
            Point::new(1.0, 1.0),
            Point::pen_up(),
            Point::new(2.0, 2.0),
        ]);
        let clipped = clip_polyline(&path, &BOUNDS);
        assert_eq!(clipped, path);
        assert_eq!(clip_polyline(&clipped, &BOUNDS), clipped);
    }

    #[test]
    fn clipping_is_idempotent() {
        let paths = [
            pl(&[(50.0, 90.0), (50.0, 150.0), (150.0, 150.0), (90.0, 50.0)]),
            pl(&[(-50.0, 50.0), (150.0, 50.0), (40.0, 40.0)]),
            pl(&[(-10.0, 5.0), (10.0, 5.0), (200.0, -30.0)]),
            pl(&[(120.0, 120.0), (-30.0, 20.0), (-30.0, -30.0)]),
        ];
        for path in &paths {
            let once = clip_polyline(path, &BOUNDS);
            assert!(all_inside(&once), "{once:?}");
            assert_eq!(clip_polyline(&once, &BOUNDS), once);
        }
    }

    #[test]
    fn trace_boundary_same_edge_has_no_corners() {
        let exit = BoundaryHit {
            point: Point::new(10.0, 100.0),
            edge: Edge::Top,
        };
        let entry = BoundaryHit {
            point: Point::new(80.0, 100.0),
            edge: Edge::Top,
        };
        assert!(trace_boundary(exit, entry, &BOUNDS).is_empty());
    }

    #[test]
    fn trace_boundary_counter_clockwise_single_corner() {
        let exit = BoundaryHit {
            point: Point::new(10.0, 100.0),
            edge: Edge::Top,
        };
        let entry = BoundaryHit {
            point: Point::new(0.0, 40.0),
            edge: Edge::Left,
        };
        assert_eq!(
            trace_boundary(exit, entry, &BOUNDS),
            vec![Point::new(0.0, 100.0)]
        );
    }

    #[test]
    fn intersections_report_edges() {
        let exit = exit_intersection(Point::new(50.0, 50.0), Point::new(50.0, -50.0), &BOUNDS).unwrap();
        assert_eq!(exit.edge, Edge::Bottom);
        assert_eq!(exit.point, Point::new(50.0, 0.0));

        let entry =
            entry_intersection(Point::new(150.0, 50.0), Point::new(50.0, 50.0), &BOUNDS).unwrap();
        assert_eq!(entry.edge, Edge::Right);
        assert_eq!(entry.point, Point::new(100.0, 50.0));
    }

    #[test]
    fn clamp_helper_keeps_breaks() {
        assert!(clamp_to_boundary(Point::pen_up(), &BOUNDS).is_break());
        assert_eq!(
            clamp_to_boundary(Point::new(-1.0, 101.0), &BOUNDS),
            Point::new(0.0, 100.0)
        );
        assert!(is_inside_boundary(Point::new(100.0, 0.0), &BOUNDS));
    }
}
