//! SVG preview renderer.
//!
//! Draws machine-space strokes the way the table's screen shows them:
//! every point goes back through the inverse canvas transform, so the
//! table rotation and offsets are undone and the drawing appears as it
//! was authored.
//!
//! Each polyline becomes one `<path>` element.  Pen-up markers inside a
//! polyline start a new `M` subpath rather than a new element.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Path, Title};
use svg::node::{Text, Value};

use sandypi_pipeline::{CanvasSize, Point, Polyline, TableConfig, to_canvas};

use crate::preview::GcodePreview;

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title -- emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description -- emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Every continuous stroke of at least two points contributes one `M`
/// followed by `L` commands.  Returns an empty string when no stroke
/// qualifies.
///
/// # Examples
///
/// ```
/// use sandypi_pipeline::{Point, Polyline};
/// use sandypi_export::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// assert_eq!(build_path_data(&polyline), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    build_mapped_path_data(polyline, |p| p)
}

fn build_mapped_path_data(polyline: &Polyline, map: impl Fn(Point) -> Point) -> String {
    let mut data = Data::new();
    let mut any = false;
    for stroke in polyline.strokes() {
        let points = stroke.points();
        if points.len() < 2 {
            continue;
        }
        let first = map(points[0]);
        data = data.move_to((first.x, first.y));
        for &p in &points[1..] {
            let p = map(p);
            data = data.line_to((p.x, p.y));
        }
        any = true;
    }
    if any {
        String::from(Value::from(data))
    } else {
        String::new()
    }
}

/// Render machine-space paths onto a canvas of the given size.
#[must_use]
pub fn to_svg(
    paths: &[Polyline],
    config: &TableConfig,
    canvas: CanvasSize,
    metadata: &SvgMetadata<'_>,
) -> String {
    let mut doc = Document::new()
        .set("width", canvas.width)
        .set("height", canvas.height)
        .set("viewBox", (0, 0, canvas.width, canvas.height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    for path in paths {
        let d = build_mapped_path_data(path, |p| to_canvas(p, config, canvas));
        if d.is_empty() {
            continue;
        }
        let element = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1);
        doc = doc.add(element);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Render parsed G-code.
///
/// The parsed strokes are already in machine units, so this is
/// [`to_svg`] over [`GcodePreview::strokes`].
#[must_use]
pub fn to_preview_svg(
    preview: &GcodePreview,
    config: &TableConfig,
    canvas: CanvasSize,
    metadata: &SvgMetadata<'_>,
) -> String {
    to_svg(&preview.strokes, config, canvas, metadata)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sandypi_pipeline::Rotation;

    use super::*;

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    /// A config whose drawing area maps 1:1 onto a canvas of the same size
    /// at rotation 0 (machine x is screen y).
    fn square_config() -> TableConfig {
        TableConfig {
            draw_width: 100.0,
            draw_height: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
            ..TableConfig::default()
        }
    }

    #[test]
    fn build_path_data_empty_polyline() {
        assert_eq!(build_path_data(&Polyline::new(vec![])), "");
    }

    #[test]
    fn build_path_data_single_point() {
        let polyline = Polyline::new(vec![Point::new(5.0, 5.0)]);
        assert_eq!(build_path_data(&polyline), "");
    }

    #[test]
    fn build_path_data_splits_at_breaks() {
        let polyline = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::pen_up(),
            Point::new(2.0, 2.0),
            Point::pen_up(),
            Point::new(3.0, 3.0),
            Point::new(4.0, 4.0),
        ]);
        assert_eq!(build_path_data(&polyline), "M0,0 L1,1 M3,3 L4,4");
    }

    #[test]
    fn empty_paths_produce_valid_svg() {
        let svg = to_svg(
            &[],
            &square_config(),
            CanvasSize::new(100.0, 100.0),
            &no_meta(),
        );
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("viewBox=\"0 0 100 100\""));
        assert!(!svg.contains("<path"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn machine_points_map_back_to_canvas() {
        // Machine (x, y) at rotation 0 is canvas (y, x).
        let path = Polyline::new(vec![Point::new(10.0, 20.0), Point::new(30.0, 40.0)]);
        let svg = to_svg(
            &[path],
            &square_config(),
            CanvasSize::new(100.0, 100.0),
            &no_meta(),
        );
        assert!(svg.contains("d=\"M20,10 L40,30\""));
    }

    #[test]
    fn rotation_is_undone() {
        let config = TableConfig {
            rotation: Rotation::Deg180,
            ..square_config()
        };
        let path = Polyline::new(vec![Point::new(100.0, 100.0), Point::new(90.0, 100.0)]);
        let svg = to_svg(&[path], &config, CanvasSize::new(100.0, 100.0), &no_meta());
        assert!(svg.contains("d=\"M0,0 L0,10\""));
    }

    #[test]
    fn title_and_desc_emitted_and_escaped() {
        let meta = SvgMetadata {
            title: Some("rose & star"),
            description: Some("petals < 9"),
        };
        let svg = to_svg(
            &[],
            &square_config(),
            CanvasSize::new(10.0, 10.0),
            &meta,
        );
        assert!(svg.contains("<title>rose &amp; star</title>"));
        assert!(svg.contains("<desc>petals &lt; 9</desc>"));
    }

    #[test]
    fn preview_renders_parsed_strokes() {
        let preview = crate::preview::parse_gcode("G0 X0 Y0\nG1 X50 Y50\nG0 X10 Y0\nG1 X10 Y10\n")
            .unwrap();
        let svg = to_preview_svg(
            &preview,
            &square_config(),
            CanvasSize::new(100.0, 100.0),
            &no_meta(),
        );
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("d=\"M0,0 L50,50\""));
        assert!(svg.contains("d=\"M0,10 L10,10\""));
    }
}
