//! G-code preview parser.
//!
//! Reads stored G-code back into machine-space strokes so a drawing can
//! be previewed without the table.  Only rapid (`G0`) and linear (`G1`)
//! moves are understood; every other line is ignored.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use sandypi_pipeline::{Point, Polyline};

/// Errors from [`parse_gcode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// The text contains no `G0`/`G1` move.
    #[error("no G0/G1 moves found in G-code")]
    NoMoves,
}

/// Strokes recovered from G-code text, in machine units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GcodePreview {
    /// One polyline per `G0`-initiated stroke.
    pub strokes: Vec<Polyline>,

    /// Authoring space tag from the type marker comment, if present
    /// (e.g. `CANVAS`, `CENTER-NORMALIZED`).  A bare
    /// `; TYPE: PRE-TRANSFORMED` marker reports `PRE-TRANSFORMED`.
    pub space: Option<String>,
}

impl GcodePreview {
    /// Total number of move points across all strokes.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Polyline::len).sum()
    }
}

/// Space reported for a marker without a `SPACE:` tag.
const BARE_MARKER: &str = "PRE-TRANSFORMED";

struct Patterns {
    command: Regex,
    axis: Regex,
    marker: Regex,
}

#[allow(clippy::expect_used)] // literal patterns
fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        command: Regex::new(r"(?i)^\s*G0?([01])(?:\s|$|[XYFxyf])").expect("invalid command pattern"),
        axis: Regex::new(r"(?i)([XY])\s*(-?\d*\.?\d+(?:[eE][-+]?\d+)?)").expect("invalid axis pattern"),
        marker: Regex::new(r"(?i)TYPE:\s*PRE-TRANSFORMED(?:\s+SPACE:\s*([A-Z-]+))?")
            .expect("invalid marker pattern"),
    })
}

/// Parse G-code text into strokes.
///
/// - A line's command is its first word: `G0`, `G00`, `G1` or `G01`, in
///   either case.
/// - `X`/`Y` values may appear in any order; a missing axis keeps the
///   previous value, starting from `(0, 0)`.
/// - `G0` starts a new stroke; `G1` extends the current one (starting
///   it from the last known position if the file opens with `G1`).
/// - `;` starts a comment.  The type marker written by
///   [`to_gcode`](crate::gcode::to_gcode) is read from the first
///   comment that carries one.
///
/// # Errors
///
/// Returns [`PreviewError::NoMoves`] if no move command is found.
pub fn parse_gcode(text: &str) -> Result<GcodePreview, PreviewError> {
    let patterns = patterns();

    let mut strokes = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut position: Option<Point> = None;
    let mut space = None;
    let mut moves = 0_usize;

    for raw in text.lines() {
        let (code, comment) = raw.split_once(';').unwrap_or((raw, ""));
        if space.is_none()
            && let Some(caps) = patterns.marker.captures(comment)
        {
            let tag = caps.get(1).map_or(BARE_MARKER, |m| m.as_str());
            space = Some(tag.to_ascii_uppercase());
        }

        let Some(caps) = patterns.command.captures(code) else {
            continue;
        };
        let rapid = &caps[1] == "0";

        let last = position.unwrap_or(Point::new(0.0, 0.0));
        let mut target = last;
        for axis in patterns.axis.captures_iter(code) {
            let Ok(value) = axis[2].parse::<f64>() else {
                continue;
            };
            if axis[1].eq_ignore_ascii_case("x") {
                target.x = value;
            } else {
                target.y = value;
            }
        }
        moves += 1;

        if rapid {
            if !current.is_empty() {
                strokes.push(Polyline::new(std::mem::take(&mut current)));
            }
        } else if current.is_empty()
            && let Some(start) = position
        {
            current.push(start);
        }
        current.push(target);
        position = Some(target);
    }

    if !current.is_empty() {
        strokes.push(Polyline::new(current));
    }
    if moves == 0 {
        return Err(PreviewError::NoMoves);
    }
    Ok(GcodePreview { strokes, space })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn xy(p: &Point) -> (f64, f64) {
        (p.x, p.y)
    }

    #[test]
    fn splits_strokes_at_rapid_moves() {
        let text = "G0 X1 Y2\nG1 X3 Y4 F2000\nG0 X5 Y6\nG1 X7 Y8\n";
        let preview = parse_gcode(text).unwrap();
        assert_eq!(preview.strokes.len(), 2);
        let first: Vec<_> = preview.strokes[0].points().iter().map(xy).collect();
        assert_eq!(first, [(1.0, 2.0), (3.0, 4.0)]);
        let second: Vec<_> = preview.strokes[1].points().iter().map(xy).collect();
        assert_eq!(second, [(5.0, 6.0), (7.0, 8.0)]);
        assert_eq!(preview.point_count(), 4);
    }

    #[test]
    fn missing_axis_carries_previous_value() {
        let text = "G0 X10 Y20\nG1 X30\nG1 Y40\n";
        let preview = parse_gcode(text).unwrap();
        let points: Vec<_> = preview.strokes[0].points().iter().map(xy).collect();
        assert_eq!(points, [(10.0, 20.0), (30.0, 20.0), (30.0, 40.0)]);
    }

    #[test]
    fn axis_order_and_case_are_free() {
        let text = "g00 y2.5 x-1.25\ng01 Y3 X4\n";
        let preview = parse_gcode(text).unwrap();
        let points: Vec<_> = preview.strokes[0].points().iter().map(xy).collect();
        assert_eq!(points, [(-1.25, 2.5), (4.0, 3.0)]);
    }

    #[test]
    fn first_move_without_axes_starts_at_origin() {
        let preview = parse_gcode("G0\nG1 X5\n").unwrap();
        let points: Vec<_> = preview.strokes[0].points().iter().map(xy).collect();
        assert_eq!(points, [(0.0, 0.0), (5.0, 0.0)]);
    }

    #[test]
    fn comments_and_other_commands_ignored() {
        let text = "; header X99 Y99\nG28\nM3 S1000\nG0 X1 Y1 ; X50\nG10 X7\nG1 X2 Y2\n";
        let preview = parse_gcode(text).unwrap();
        assert_eq!(preview.strokes.len(), 1);
        let points: Vec<_> = preview.strokes[0].points().iter().map(xy).collect();
        assert_eq!(points, [(1.0, 1.0), (2.0, 2.0)]);
    }

    #[test]
    fn leading_linear_moves_form_one_stroke() {
        let text = "G1 X1 Y1\nG1 X2 Y2\n";
        let preview = parse_gcode(text).unwrap();
        assert_eq!(preview.strokes.len(), 1);
        assert_eq!(preview.strokes[0].len(), 2);
    }

    #[test]
    fn reads_type_marker() {
        let text = "G0 X0 Y50 ; TYPE: PRE-TRANSFORMED SPACE: CANVAS\nG1 X1 Y51 F2000\n";
        let preview = parse_gcode(text).unwrap();
        assert_eq!(preview.space.as_deref(), Some("CANVAS"));

        let untagged = parse_gcode("; TYPE: PRE-TRANSFORMED\nG0 X0 Y0\nG1 X1 Y1\n").unwrap();
        assert_eq!(untagged.space.as_deref(), Some("PRE-TRANSFORMED"));

        let lower = parse_gcode("G0 X0 Y0 ; type: pre-transformed space: center-normalized\n")
            .unwrap();
        assert_eq!(lower.space.as_deref(), Some("CENTER-NORMALIZED"));

        let bare = parse_gcode("G0 X0 Y0\n").unwrap();
        assert_eq!(bare.space, None);
    }

    #[test]
    fn no_moves_is_an_error() {
        assert_eq!(parse_gcode(""), Err(PreviewError::NoMoves));
        assert_eq!(
            parse_gcode("; nothing here\nM3\nG28\n"),
            Err(PreviewError::NoMoves)
        );
    }
}
