//! Shared types for the sandypi geometry pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in whichever coordinate space the surrounding path uses.
///
/// A point with `is_break` set (or with a non-finite coordinate) is a
/// pen-up marker: it separates two strokes inside one [`Polyline`] and
/// is never drawn to.
///
/// Equality treats every pen-up marker as equal to every other, whatever
/// its coordinates; drawable points compare by coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Pen-up marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_break: bool,
}

impl Point {
    /// Create a new drawable point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            is_break: false,
        }
    }

    /// Create a pen-up marker.
    ///
    /// Coordinates are NaN so that a consumer which ignores the flag
    /// still cannot draw to it.
    #[must_use]
    pub const fn pen_up() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            is_break: true,
        }
    }

    /// Returns `true` for pen-up markers and points with non-finite
    /// coordinates.
    #[must_use]
    pub const fn is_break(self) -> bool {
        self.is_break || !self.x.is_finite() || !self.y.is_finite()
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl PartialEq for Point {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self.is_break(), other.is_break()) {
            (true, true) => true,
            (false, false) => self.x == other.x && self.y == other.y,
            _ => false,
        }
    }
}

/// A sequence of points forming one stroke, optionally segmented by
/// pen-up markers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points, pen-up markers included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Split at pen-up markers into continuous strokes.
    ///
    /// Markers are dropped and empty strokes are skipped.
    #[must_use]
    pub fn strokes(&self) -> Vec<Self> {
        self.0
            .split(|p| p.is_break())
            .filter(|stroke| !stroke.is_empty())
            .map(|stroke| Self(stroke.to_vec()))
            .collect()
    }

    /// Join strokes into one polyline with a pen-up marker between each.
    #[must_use]
    pub fn from_strokes(strokes: impl IntoIterator<Item = Self>) -> Self {
        let mut points = Vec::new();
        for stroke in strokes {
            if stroke.is_empty() {
                continue;
            }
            if !points.is_empty() {
                points.push(Point::pen_up());
            }
            points.extend(stroke.0);
        }
        Self(points)
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Pixel size of a drawing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl CanvasSize {
    /// Create a new canvas size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }
}

/// Axis-aligned safe drawing rectangle in machine coordinates.
///
/// Built from [`TableConfig::bounds`](crate::TableConfig::bounds), which
/// guarantees `min_x < max_x` and `min_y < max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest allowed X.
    pub min_x: f64,
    /// Largest allowed X.
    pub max_x: f64,
    /// Smallest allowed Y.
    pub min_y: f64,
    /// Largest allowed Y.
    pub max_y: f64,
}

impl Bounds {
    /// Returns `true` if the point lies inside or on the rectangle.
    ///
    /// Pen-up markers are never inside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        !p.is_break()
            && p.x >= self.min_x
            && p.x <= self.max_x
            && p.y >= self.min_y
            && p.y <= self.max_y
    }

    /// Clamp a point onto the rectangle.
    #[must_use]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Errors from editing a pattern-builder document.
///
/// Geometry itself never fails: bad parameters are clamped or defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// No layer carries the given id.
    #[error("no layer with id {0}")]
    UnknownLayer(u64),

    /// A parameter patch does not fit the layer's pattern type.
    #[error("invalid pattern parameters: {0}")]
    InvalidParams(String),

    /// A reorder index is past the end of the layer list.
    #[error("layer index {index} is out of range for {len} layers")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of layers at the time of the request.
        len: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds {
        min_x: 0.0,
        max_x: 100.0,
        min_y: 0.0,
        max_y: 50.0,
    };

    // --- Point tests ---

    #[test]
    fn point_new_is_drawable() {
        let p = Point::new(3.0, 4.0);
        assert!((p.x - 3.0).abs() < f64::EPSILON);
        assert!((p.y - 4.0).abs() < f64::EPSILON);
        assert!(!p.is_break());
    }

    #[test]
    fn pen_up_is_break() {
        assert!(Point::pen_up().is_break());
    }

    #[test]
    fn nan_coordinate_is_break() {
        assert!(Point::new(f64::NAN, 1.0).is_break());
        assert!(Point::new(1.0, f64::INFINITY).is_break());
    }

    #[test]
    fn pen_up_markers_compare_equal() {
        assert_eq!(Point::pen_up(), Point::pen_up());
        assert_eq!(Point::pen_up(), Point::new(f64::NAN, 1.0));
        assert_ne!(Point::pen_up(), Point::new(0.0, 0.0));
        assert_ne!(Point::new(0.0, 0.0), Point::new(0.0, 1e-12));
    }

    #[test]
    fn polyline_with_break_equals_itself() {
        let path = Polyline::new(vec![
            Point::new(1.0, 1.0),
            Point::pen_up(),
            Point::new(2.0, 2.0),
        ]);
        assert_eq!(path, path.clone());
        assert_eq!(
            Polyline::from_strokes(path.strokes()),
            path,
            "split and rejoin keeps the marker"
        );
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_empty() {
        let pl = Polyline::new(vec![]);
        assert!(pl.is_empty());
        assert_eq!(pl.len(), 0);
        assert!(pl.first().is_none());
        assert!(pl.last().is_none());
    }

    #[test]
    fn strokes_split_at_breaks() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::pen_up(),
            Point::pen_up(),
            Point::new(5.0, 5.0),
            Point::new(f64::NAN, 0.0),
        ]);
        let strokes = pl.strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].len(), 2);
        assert_eq!(strokes[1].points(), &[Point::new(5.0, 5.0)]);
    }

    #[test]
    fn from_strokes_inserts_single_breaks() {
        let joined = Polyline::from_strokes(vec![
            Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]),
            Polyline::new(vec![]),
            Polyline::new(vec![Point::new(2.0, 2.0)]),
        ]);
        assert_eq!(joined.len(), 4);
        assert!(joined.points()[2].is_break());
        assert_eq!(joined.strokes().len(), 2);
    }

    // --- Bounds tests ---

    #[test]
    fn bounds_contains_edges() {
        assert!(BOUNDS.contains(Point::new(0.0, 0.0)));
        assert!(BOUNDS.contains(Point::new(100.0, 50.0)));
        assert!(!BOUNDS.contains(Point::new(100.1, 50.0)));
        assert!(!BOUNDS.contains(Point::pen_up()));
    }

    #[test]
    fn bounds_clamp() {
        assert_eq!(BOUNDS.clamp(Point::new(-5.0, 70.0)), Point::new(0.0, 50.0));
        assert_eq!(BOUNDS.clamp(Point::new(10.0, 20.0)), Point::new(10.0, 20.0));
    }

    // --- Serde ---

    #[test]
    fn point_serde_omits_false_break_flag() {
        let json = serde_json::to_string(&Point::new(1.5, -2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":-2.0}"#);
        let back: Point = serde_json::from_str(r#"{"x":1.5,"y":-2.0}"#).unwrap();
        assert_eq!(back, Point::new(1.5, -2.0));
    }
}
