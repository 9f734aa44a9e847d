//! G-code export serializer.
//!
//! Converts polylines into the G-code dialect understood by the sand
//! table firmware: one command per line, `G0` for rapid positioning to
//! the start of each stroke and `G1` for the drawn moves in between.
//!
//! Paths are first carried into machine space (and clipped to the
//! drawing area unless disabled), so every coordinate in the output is
//! in table units regardless of the space the paths were authored in.
//!
//! ## Modal state
//!
//! The feedrate is written once, on the first `G1` of the file.  The
//! firmware keeps it as modal state for every later linear move.
//!
//! ## Type marker
//!
//! The first `G0` carries a trailing comment of the form
//! `; TYPE: PRE-TRANSFORMED SPACE: <tag>`.  Consumers such as the live
//! preview read it to learn that coordinates need no further scaling,
//! and which space the drawing was authored in.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use sandypi_pipeline::{CoordinateSpace, Polyline, TableConfig, to_machine_paths};

/// Feedrate used when none (or an unusable one) is given, in table
/// units per minute.
pub const DEFAULT_FEEDRATE: f64 = 2000.0;

/// Prefix of the type marker comment on the first `G0`.
pub const TYPE_MARKER: &str = "TYPE: PRE-TRANSFORMED SPACE:";

/// Serializer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GcodeOptions {
    /// Linear move speed written on the first `G1`.
    pub feedrate: f64,

    /// Space the input paths are expressed in.
    pub coordinate_space: CoordinateSpace,

    /// Clip every path to the drawing area before emitting it.
    pub clip: bool,
}

impl Default for GcodeOptions {
    fn default() -> Self {
        Self {
            feedrate: DEFAULT_FEEDRATE,
            coordinate_space: CoordinateSpace::CenterNormalized,
            clip: true,
        }
    }
}

/// Metadata to embed as `;`-prefixed comment lines before the first
/// move.
///
/// All fields are optional.  When present, the corresponding comment
/// line is emitted.  Firmware ignores everything after `;`.
#[derive(Debug, Clone, Default)]
pub struct GcodeMetadata<'a> {
    /// Drawing name -- emitted as `; Title: <title>`.
    pub title: Option<&'a str>,

    /// Free-form description (pattern parameters, tool name) -- emitted
    /// as a plain `;` comment per line.
    pub description: Option<&'a str>,

    /// Export timestamp -- emitted as `; Exported: <timestamp>`.
    pub timestamp: Option<&'a str>,
}

/// Serialize paths into G-code text.
///
/// Each continuous stroke starts with a `G0` to its first point and
/// continues with one `G1` per following point.  Pen-up markers and
/// non-finite points end the current stroke; the next valid point
/// starts a new one with `G0`.  Coordinates use three decimals.
///
/// A non-positive or non-finite `options.feedrate` falls back to
/// [`DEFAULT_FEEDRATE`].
///
/// # Examples
///
/// ```
/// use sandypi_pipeline::{CoordinateSpace, Point, Polyline, TableConfig};
/// use sandypi_export::gcode::{GcodeMetadata, GcodeOptions, to_gcode};
///
/// let paths = vec![Polyline::new(vec![
///     Point::new(10.0, 60.0),
///     Point::new(20.0, 70.0),
/// ])];
/// let options = GcodeOptions {
///     coordinate_space: CoordinateSpace::PreTransformed,
///     ..GcodeOptions::default()
/// };
/// let gcode = to_gcode(&paths, &TableConfig::default(), &options, &GcodeMetadata::default());
/// assert_eq!(
///     gcode,
///     "G0 X10.000 Y60.000 ; TYPE: PRE-TRANSFORMED SPACE: PRE-TRANSFORMED\n\
///      G1 X20.000 Y70.000 F2000\n",
/// );
/// ```
#[must_use]
pub fn to_gcode(
    paths: &[Polyline],
    config: &TableConfig,
    options: &GcodeOptions,
    metadata: &GcodeMetadata<'_>,
) -> String {
    let machine = to_machine_paths(paths, options.coordinate_space, config, options.clip);
    let feedrate = effective_feedrate(options.feedrate);

    let mut out = String::new();

    // --- Metadata header ---
    if let Some(title) = metadata.title {
        for line in title.lines() {
            let _ = writeln!(out, "; Title: {line}");
        }
    }
    if let Some(description) = metadata.description {
        for line in description.lines() {
            let _ = writeln!(out, "; {line}");
        }
    }
    if let Some(timestamp) = metadata.timestamp {
        for line in timestamp.lines() {
            let _ = writeln!(out, "; Exported: {line}");
        }
    }

    // --- Moves ---
    let mut marked = false;
    let mut feed_written = false;
    for path in &machine {
        let mut pen_down = false;
        for &p in path.points() {
            if p.is_break() {
                pen_down = false;
                continue;
            }
            let x = format_coordinate(p.x);
            let y = format_coordinate(p.y);
            if pen_down {
                let _ = write!(out, "G1 X{x} Y{y}");
                if !feed_written {
                    let _ = write!(out, " F{feedrate}");
                    feed_written = true;
                }
            } else {
                let _ = write!(out, "G0 X{x} Y{y}");
                if !marked {
                    let _ = write!(out, " ; {TYPE_MARKER} {}", options.coordinate_space.tag());
                    marked = true;
                }
                pen_down = true;
            }
            out.push('\n');
        }
    }

    out
}

/// Feedrate actually written, after falling back from unusable values.
#[must_use]
pub fn effective_feedrate(feedrate: f64) -> f64 {
    if feedrate.is_finite() && feedrate > 0.0 {
        feedrate
    } else {
        DEFAULT_FEEDRATE
    }
}

/// Format one coordinate with three decimals.
///
/// Negative zero prints as `0.000`; non-finite input prints as `0.000`
/// rather than leaking `NaN` into the command stream.
fn format_coordinate(value: f64) -> String {
    if !value.is_finite() {
        return String::from("0.000");
    }
    let s = format!("{value:.3}");
    if s == "-0.000" { String::from("0.000") } else { s }
}
