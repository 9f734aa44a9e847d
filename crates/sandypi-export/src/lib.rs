//! sandypi-export: Pure format serializers and parsers (sans-IO)
//!
//! Turns polylines into G-code for the table, reads stored G-code back
//! into strokes, and renders either as an SVG preview.

pub mod gcode;
pub mod preview;
pub mod svg;

pub use gcode::{DEFAULT_FEEDRATE, GcodeMetadata, GcodeOptions, to_gcode};
pub use preview::{GcodePreview, PreviewError, parse_gcode};
pub use svg::{SvgMetadata, build_path_data, to_preview_svg, to_svg};
