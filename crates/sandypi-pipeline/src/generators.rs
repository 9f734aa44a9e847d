//! Parametric pattern generators.
//!
//! Every generator is a pure function of its parameters and returns a
//! single [`Polyline`] in center-normalized pattern space (roughly
//! `[-1, 1]²`, +Y up). Out-of-range counts are clamped to their minimum
//! rather than rejected, and normalization never divides by a zero or
//! non-finite maximum, so no generator produces NaN.
//!
//! [`Pattern`] bundles a pattern type with its parameters for the
//! pattern builder; it implements [`PatternGenerator`] so callers can
//! dispatch on it without matching.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::font;
use crate::types::{Point, Polyline};

/// Trait for anything that can produce a pattern polyline.
pub trait PatternGenerator {
    /// Generate the pattern's points.
    fn generate(&self) -> Polyline;
}

/// Circle or regular polygon, `sides + 1` points with the last point
/// repeating the first.
#[must_use]
pub fn polygon(sides: u32, radius: f64, rotation_deg: f64) -> Polyline {
    let sides = sides.max(3);
    let radius = sanitize_radius(radius);
    let rotation = finite_or(rotation_deg, 0.0).to_radians();

    let mut points: Vec<Point> = (0..sides)
        .map(|i| {
            let angle = (f64::from(i) / f64::from(sides)).mul_add(TAU, rotation);
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    Polyline::new(points)
}

/// Direction a spiral is drawn in.
///
/// Serialized as `1` (outward) or `-1` (inward), the form layer
/// documents use. `"outward"` and `"inward"` are also accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "DirectionRepr", into = "i8")]
pub enum SpiralDirection {
    /// From the center outward.
    #[default]
    Outward,
    /// From the rim inward.
    Inward,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectionRepr {
    Sign(i64),
    Name(String),
}

impl TryFrom<DirectionRepr> for SpiralDirection {
    type Error = String;

    fn try_from(repr: DirectionRepr) -> Result<Self, Self::Error> {
        match repr {
            DirectionRepr::Sign(1) => Ok(Self::Outward),
            DirectionRepr::Sign(-1) => Ok(Self::Inward),
            DirectionRepr::Name(name) if name.eq_ignore_ascii_case("outward") => Ok(Self::Outward),
            DirectionRepr::Name(name) if name.eq_ignore_ascii_case("inward") => Ok(Self::Inward),
            DirectionRepr::Sign(n) => Err(format!("spiral direction must be 1 or -1, got {n}")),
            DirectionRepr::Name(name) => Err(format!("unknown spiral direction {name:?}")),
        }
    }
}

impl From<SpiralDirection> for i8 {
    fn from(direction: SpiralDirection) -> Self {
        match direction {
            SpiralDirection::Outward => 1,
            SpiralDirection::Inward => -1,
        }
    }
}

/// Archimedean spiral: radius grows linearly with angle.
///
/// Normalized so the largest radius is 1.
#[must_use]
pub fn archimedean_spiral(
    turns: u32,
    spacing: f64,
    direction: SpiralDirection,
    samples: u32,
) -> Polyline {
    let turns = turns.max(1);
    let spacing = finite_or(spacing, 0.0);
    spiral(turns, samples, direction, |t| t * f64::from(turns) * spacing)
}

/// Fermat spiral: radius grows with the square root of the angle.
///
/// Normalized with the same policy as [`archimedean_spiral`].
#[must_use]
pub fn fermat_spiral(turns: u32, direction: SpiralDirection, samples: u32) -> Polyline {
    spiral(turns.max(1), samples, direction, f64::sqrt)
}

fn spiral(
    turns: u32,
    samples: u32,
    direction: SpiralDirection,
    radius_at: impl Fn(f64) -> f64,
) -> Polyline {
    let total = turns.saturating_mul(samples.max(1));
    let turns = f64::from(turns);
    let points = (0..=total)
        .map(|i| {
            let progress = f64::from(i) / f64::from(total);
            let t = match direction {
                SpiralDirection::Outward => progress,
                SpiralDirection::Inward => 1.0 - progress,
            };
            let angle = t * turns * TAU;
            let r = radius_at(t);
            Point::new(r * angle.cos(), r * angle.sin())
        })
        .collect();
    normalize_radius(points)
}

/// Rose curve `r = amplitude · cos(k θ)`.
///
/// Odd `petals` draw `k` petals in one loop; even values need two loops
/// to close the `2k` petals.
#[must_use]
pub fn rose(petals: u32, amplitude: f64, samples: u32) -> Polyline {
    let k = petals.max(1);
    let amplitude = sanitize_radius(amplitude);
    let samples = samples.max(1);
    let loops = if k % 2 == 0 { 2 } else { 1 };
    let k = f64::from(k);

    (0..=samples.saturating_mul(loops))
        .map(|i| {
            let theta = f64::from(i) / f64::from(samples) * TAU;
            let r = amplitude * (k * theta).cos();
            Point::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

/// Epitrochoid traced by a pen on a circle of radius `inner_radius`
/// rolling inside a circle of radius `outer_radius`.
///
/// The pen sits at `pen_offset · inner_radius` from the rolling center.
/// A zero inner radius degenerates to a plain circle. The result is
/// scaled so the largest absolute coordinate is 1.
#[must_use]
pub fn spirograph(
    outer_radius: f64,
    inner_radius: f64,
    pen_offset: f64,
    rotations: u32,
    samples: u32,
) -> Polyline {
    let big_r = finite_or(outer_radius, 1.0);
    let small_r = finite_or(inner_radius, 0.0);
    let d = finite_or(pen_offset, 0.0) * small_r;
    let samples = samples.max(1);
    let total = rotations.max(1).saturating_mul(samples);
    let ratio = if small_r == 0.0 {
        0.0
    } else {
        (big_r - small_r) / small_r
    };

    let points = (0..=total)
        .map(|i| {
            let t = f64::from(i) / f64::from(samples) * TAU;
            Point::new(
                (big_r - small_r).mul_add(t.cos(), d * (ratio * t).cos()),
                (big_r - small_r).mul_add(t.sin(), -(d * (ratio * t).sin())),
            )
        })
        .collect();
    normalize_max_abs(points)
}

/// Star with `2 · points + 1` vertices alternating between radius 1 and
/// `inner_ratio`, vertex 0 at −90°.
#[must_use]
pub fn star(points: u32, inner_ratio: f64, rotation_deg: f64) -> Polyline {
    let n = points.max(3);
    let inner = finite_or(inner_ratio, 0.5);
    let rotation = finite_or(rotation_deg, 0.0).to_radians();
    let vertices = 2 * n;

    (0..=vertices)
        .map(|i| {
            let angle = (f64::from(i) / f64::from(vertices)).mul_add(TAU, rotation) - FRAC_PI_2;
            let r = if i % 2 == 0 { 1.0 } else { inner };
            Point::new(r * angle.cos(), r * angle.sin())
        })
        .collect()
}

/// Lissajous figure `x = sin(fx·t + phase)`, `y = sin(fy·t)` over one
/// period.
#[must_use]
pub fn lissajous(freq_x: f64, freq_y: f64, phase_deg: f64, samples: u32) -> Polyline {
    let fx = finite_or(freq_x, 3.0);
    let fy = finite_or(freq_y, 2.0);
    let phase = finite_or(phase_deg, 0.0).to_radians();
    let samples = samples.max(1);

    (0..=samples)
        .map(|i| {
            let t = f64::from(i) / f64::from(samples) * TAU;
            Point::new(fx.mul_add(t, phase).sin(), (fy * t).sin())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pattern parameters
// ---------------------------------------------------------------------------

/// Which pattern a layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Many-sided polygon.
    Circle,
    /// Regular polygon.
    Polygon,
    /// Archimedean or Fermat spiral.
    Spiral,
    /// Rose curve.
    Rose,
    /// Epitrochoid.
    Spirograph,
    /// Star polygon.
    Star,
    /// Lissajous figure.
    Lissajous,
    /// Single-stroke text.
    Text,
}

impl PatternKind {
    /// Every pattern kind.
    pub const ALL: [Self; 8] = [
        Self::Circle,
        Self::Polygon,
        Self::Spiral,
        Self::Rose,
        Self::Spirograph,
        Self::Star,
        Self::Lissajous,
        Self::Text,
    ];

    /// The pattern of this kind with default parameters.
    #[must_use]
    pub fn defaults(self) -> Pattern {
        match self {
            Self::Circle => Pattern::Circle(CircleParams::default()),
            Self::Polygon => Pattern::Polygon(PolygonParams::default()),
            Self::Spiral => Pattern::Spiral(SpiralParams::default()),
            Self::Rose => Pattern::Rose(RoseParams::default()),
            Self::Spirograph => Pattern::Spirograph(SpirographParams::default()),
            Self::Star => Pattern::Star(StarParams::default()),
            Self::Lissajous => Pattern::Lissajous(LissajousParams::default()),
            Self::Text => Pattern::Text(TextParams::default()),
        }
    }
}

/// Parameters of [`polygon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolygonParams {
    /// Number of sides.
    pub sides: u32,
    /// Circumradius.
    pub radius: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Default for PolygonParams {
    fn default() -> Self {
        Self {
            sides: 6,
            radius: 1.0,
            rotation: 0.0,
        }
    }
}

/// Spiral family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiralType {
    /// Linear radius growth.
    #[default]
    Archimedean,
    /// Square-root radius growth.
    Fermat,
}

/// Parameters of a circle: a [`polygon`] with many sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircleParams {
    /// Number of chords.
    pub sides: u32,
    /// Radius.
    pub radius: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            sides: 100,
            radius: 1.0,
            rotation: 0.0,
        }
    }
}

/// Parameters of the spiral generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiralParams {
    /// Spiral family.
    pub spiral_type: SpiralType,
    /// Number of turns.
    pub turns: u32,
    /// Distance between turns (Archimedean only).
    pub spacing: f64,
    /// Drawing direction.
    pub direction: SpiralDirection,
    /// Points per turn.
    pub samples: u32,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            spiral_type: SpiralType::Archimedean,
            turns: 5,
            spacing: 0.15,
            direction: SpiralDirection::Outward,
            samples: 50,
        }
    }
}

/// Parameters of [`rose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoseParams {
    /// The `k` in `cos(kθ)`.
    pub petals: u32,
    /// Petal length.
    pub amplitude: f64,
    /// Points per loop.
    pub samples: u32,
}

impl Default for RoseParams {
    fn default() -> Self {
        Self {
            petals: 5,
            amplitude: 1.0,
            samples: 360,
        }
    }
}

/// Parameters of [`spirograph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpirographParams {
    /// Fixed circle radius.
    pub outer_radius: f64,
    /// Rolling circle radius.
    pub inner_radius: f64,
    /// Pen distance as a fraction of the rolling radius.
    pub pen_offset: f64,
    /// Full turns of the rolling circle's center.
    pub rotations: u32,
    /// Points per turn.
    pub samples: u32,
}

impl Default for SpirographParams {
    fn default() -> Self {
        Self {
            outer_radius: 1.0,
            inner_radius: 0.3,
            pen_offset: 0.5,
            rotations: 10,
            samples: 100,
        }
    }
}

/// Parameters of [`star`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarParams {
    /// Number of tips.
    pub points: u32,
    /// Inner vertex radius relative to the tips.
    pub inner_ratio: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            points: 5,
            inner_ratio: 0.5,
            rotation: 0.0,
        }
    }
}

/// Parameters of [`lissajous`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LissajousParams {
    /// Horizontal frequency.
    pub freq_x: f64,
    /// Vertical frequency.
    pub freq_y: f64,
    /// Horizontal phase in degrees.
    pub phase: f64,
    /// Points over one period.
    pub samples: u32,
}

impl Default for LissajousParams {
    fn default() -> Self {
        Self {
            freq_x: 3.0,
            freq_y: 2.0,
            phase: 90.0,
            samples: 360,
        }
    }
}

/// Parameters of [`font::text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextParams {
    /// The string to write.
    pub text: String,
    /// Glyph height.
    pub font_size: f64,
    /// Extra gap between glyphs.
    pub letter_spacing: f64,
    /// Horizontal center of the string.
    pub center_x: f64,
    /// Vertical center of the string.
    pub center_y: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: "HELLO".to_string(),
            font_size: 0.3,
            letter_spacing: 0.05,
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}

/// A pattern type together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum Pattern {
    /// See [`polygon`].
    Circle(CircleParams),
    /// See [`polygon`].
    Polygon(PolygonParams),
    /// See [`archimedean_spiral`] and [`fermat_spiral`].
    Spiral(SpiralParams),
    /// See [`rose`].
    Rose(RoseParams),
    /// See [`spirograph`].
    Spirograph(SpirographParams),
    /// See [`star`].
    Star(StarParams),
    /// See [`lissajous`].
    Lissajous(LissajousParams),
    /// See [`font::text`].
    Text(TextParams),
}

impl Default for Pattern {
    fn default() -> Self {
        PatternKind::Spirograph.defaults()
    }
}

impl Pattern {
    /// The kind of this pattern.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        match self {
            Self::Circle(_) => PatternKind::Circle,
            Self::Polygon(_) => PatternKind::Polygon,
            Self::Spiral(_) => PatternKind::Spiral,
            Self::Rose(_) => PatternKind::Rose,
            Self::Spirograph(_) => PatternKind::Spirograph,
            Self::Star(_) => PatternKind::Star,
            Self::Lissajous(_) => PatternKind::Lissajous,
            Self::Text(_) => PatternKind::Text,
        }
    }
}

impl PatternGenerator for Pattern {
    fn generate(&self) -> Polyline {
        match self {
            Self::Circle(p) => polygon(p.sides, p.radius, p.rotation),
            Self::Polygon(p) => polygon(p.sides, p.radius, p.rotation),
            Self::Spiral(p) => match p.spiral_type {
                SpiralType::Archimedean => {
                    archimedean_spiral(p.turns, p.spacing, p.direction, p.samples)
                }
                SpiralType::Fermat => fermat_spiral(p.turns, p.direction, p.samples),
            },
            Self::Rose(p) => rose(p.petals, p.amplitude, p.samples),
            Self::Spirograph(p) => spirograph(
                p.outer_radius,
                p.inner_radius,
                p.pen_offset,
                p.rotations,
                p.samples,
            ),
            Self::Star(p) => star(p.points, p.inner_ratio, p.rotation),
            Self::Lissajous(p) => lissajous(p.freq_x, p.freq_y, p.phase, p.samples),
            Self::Text(p) => font::text(
                &p.text,
                p.font_size,
                p.letter_spacing,
                Point::new(p.center_x, p.center_y),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn sanitize_radius(radius: f64) -> f64 {
    finite_or(radius, 1.0).abs()
}

/// Scale so the farthest point from the origin is at distance 1.
fn normalize_radius(points: Vec<Point>) -> Polyline {
    let max = points
        .iter()
        .map(|p| p.x.hypot(p.y))
        .fold(0.0_f64, f64::max);
    scale_by(points, max)
}

/// Scale so the largest absolute coordinate is 1.
fn normalize_max_abs(points: Vec<Point>) -> Polyline {
    let max = points
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(0.0_f64, f64::max);
    scale_by(points, max)
}

fn scale_by(points: Vec<Point>, max: f64) -> Polyline {
    if max <= 0.0 || !max.is_finite() {
        return Polyline::new(points);
    }
    points
        .into_iter()
        .map(|p| Point::new(p.x / max, p.y / max))
        .collect()
}
