//! Single-stroke vector font.
//!
//! Glyphs are defined in a unit box with `y = 0` at the top. Every glyph
//! is `0.7 × size` wide and the advance is fixed, so the total width of a
//! string is known before any stroke is emitted. Output is Y-up.

use crate::types::{Point, Polyline};

type Stroke = &'static [(f64, f64)];

/// Width of a glyph relative to the font size.
const GLYPH_WIDTH: f64 = 0.7;

/// Strokes of a supported character (already uppercased).
///
/// Space is supported but has no strokes. Returns `None` for characters
/// outside the font.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn glyph(c: char) -> Option<&'static [Stroke]> {
    let strokes: &'static [Stroke] = match c {
        'A' => &[
            &[(0.0, 1.0), (0.5, 0.0), (1.0, 1.0)],
            &[(0.25, 0.5), (0.75, 0.5)],
        ],
        'B' => &[
            &[(0.0, 1.0), (0.0, 0.0), (0.7, 0.0), (1.0, 0.25), (0.7, 0.5), (0.0, 0.5)],
            &[(0.0, 0.5), (0.7, 0.5), (1.0, 0.75), (0.7, 1.0), (0.0, 1.0)],
        ],
        'C' => &[&[(1.0, 0.2), (0.5, 0.0), (0.0, 0.5), (0.5, 1.0), (1.0, 0.8)]],
        'D' => &[&[(0.0, 1.0), (0.0, 0.0), (0.6, 0.0), (1.0, 0.5), (0.6, 1.0), (0.0, 1.0)]],
        'E' => &[
            &[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            &[(0.0, 0.5), (0.8, 0.5)],
        ],
        'F' => &[
            &[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0)],
            &[(0.0, 0.5), (0.8, 0.5)],
        ],
        'G' => &[&[
            (1.0, 0.2),
            (0.5, 0.0),
            (0.0, 0.5),
            (0.5, 1.0),
            (1.0, 0.5),
            (0.8, 0.5),
        ]],
        'H' => &[
            &[(0.0, 0.0), (0.0, 1.0)],
            &[(1.0, 0.0), (1.0, 1.0)],
            &[(0.0, 0.5), (1.0, 0.5)],
        ],
        'I' => &[
            &[(0.5, 0.0), (0.5, 1.0)],
            &[(0.2, 0.0), (0.8, 0.0)],
            &[(0.2, 1.0), (0.8, 1.0)],
        ],
        'J' => &[&[(0.8, 0.0), (0.8, 0.8), (0.5, 1.0), (0.2, 0.8)]],
        'K' => &[
            &[(0.0, 0.0), (0.0, 1.0)],
            &[(1.0, 0.0), (0.0, 0.5), (1.0, 1.0)],
        ],
        'L' => &[&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]],
        'M' => &[&[(0.0, 1.0), (0.0, 0.0), (0.5, 0.6), (1.0, 0.0), (1.0, 1.0)]],
        'N' => &[&[(0.0, 1.0), (0.0, 0.0), (1.0, 1.0), (1.0, 0.0)]],
        'O' => &[&[(0.5, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 0.5), (0.5, 0.0)]],
        'P' => &[&[(0.0, 1.0), (0.0, 0.0), (0.8, 0.0), (1.0, 0.25), (0.8, 0.5), (0.0, 0.5)]],
        'Q' => &[
            &[(0.5, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 0.5), (0.5, 0.0)],
            &[(0.7, 0.7), (1.0, 1.0)],
        ],
        'R' => &[&[
            (0.0, 1.0),
            (0.0, 0.0),
            (0.8, 0.0),
            (1.0, 0.25),
            (0.8, 0.5),
            (0.0, 0.5),
            (1.0, 1.0),
        ]],
        'S' => &[&[
            (1.0, 0.2),
            (0.5, 0.0),
            (0.2, 0.2),
            (0.8, 0.8),
            (0.5, 1.0),
            (0.0, 0.8),
        ]],
        'T' => &[&[(0.5, 0.0), (0.5, 1.0)], &[(0.0, 0.0), (1.0, 0.0)]],
        'U' => &[&[(0.0, 0.0), (0.0, 0.8), (0.5, 1.0), (1.0, 0.8), (1.0, 0.0)]],
        'V' => &[&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]],
        'W' => &[&[(0.0, 0.0), (0.2, 1.0), (0.5, 0.5), (0.8, 1.0), (1.0, 0.0)]],
        'X' => &[&[(0.0, 0.0), (1.0, 1.0)], &[(1.0, 0.0), (0.0, 1.0)]],
        'Y' => &[
            &[(0.0, 0.0), (0.5, 0.5), (1.0, 0.0)],
            &[(0.5, 0.5), (0.5, 1.0)],
        ],
        'Z' => &[&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]],
        '0' => &[&[
            (0.5, 0.0),
            (1.0, 0.5),
            (0.5, 1.0),
            (0.0, 0.5),
            (0.5, 0.0),
            (1.0, 0.8),
        ]],
        '1' => &[&[(0.2, 0.2), (0.5, 0.0), (0.5, 1.0), (0.2, 1.0), (0.8, 1.0)]],
        '2' => &[&[
            (0.0, 0.2),
            (0.5, 0.0),
            (1.0, 0.2),
            (1.0, 0.5),
            (0.0, 1.0),
            (1.0, 1.0),
        ]],
        '3' => &[&[
            (0.0, 0.0),
            (1.0, 0.0),
            (0.5, 0.5),
            (1.0, 0.5),
            (1.0, 0.8),
            (0.5, 1.0),
            (0.0, 0.8),
        ]],
        '4' => &[&[(0.7, 1.0), (0.7, 0.0), (0.0, 0.7), (1.0, 0.7)]],
        '5' => &[&[
            (1.0, 0.0),
            (0.0, 0.0),
            (0.0, 0.4),
            (0.5, 0.4),
            (1.0, 0.6),
            (1.0, 0.8),
            (0.5, 1.0),
            (0.0, 0.8),
        ]],
        '6' => &[&[
            (1.0, 0.2),
            (0.5, 0.0),
            (0.0, 0.5),
            (0.0, 0.8),
            (0.5, 1.0),
            (1.0, 0.8),
            (1.0, 0.5),
            (0.0, 0.5),
        ]],
        '7' => &[&[(0.0, 0.0), (1.0, 0.0), (0.4, 1.0)]],
        '8' => &[&[
            (0.5, 0.5),
            (1.0, 0.25),
            (0.5, 0.0),
            (0.0, 0.25),
            (0.5, 0.5),
            (1.0, 0.75),
            (0.5, 1.0),
            (0.0, 0.75),
            (0.5, 0.5),
        ]],
        '9' => &[&[
            (1.0, 0.5),
            (0.0, 0.5),
            (0.0, 0.2),
            (0.5, 0.0),
            (1.0, 0.2),
            (1.0, 0.5),
            (0.5, 1.0),
            (0.0, 0.8),
        ]],
        '-' => &[&[(0.2, 0.5), (0.8, 0.5)]],
        ' ' => &[],
        _ => return None,
    };
    Some(strokes)
}

/// Lay out `text` as separate strokes centered on `center`.
///
/// Lookup is case-insensitive. Unknown characters draw nothing but still
/// take up one advance.
#[must_use]
pub fn text_strokes(text: &str, font_size: f64, letter_spacing: f64, center: Point) -> Vec<Polyline> {
    let size = if font_size.is_finite() {
        font_size.abs()
    } else {
        0.3
    };
    let spacing = if letter_spacing.is_finite() {
        letter_spacing
    } else {
        0.0
    };
    let glyph_width = GLYPH_WIDTH * size;
    let advance = glyph_width + spacing;

    let chars: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
    #[allow(clippy::cast_precision_loss)]
    let total_width = (chars.len() as f64).mul_add(advance, -spacing);
    let left = center.x - total_width / 2.0;

    let mut strokes: Vec<Polyline> = Vec::new();
    let mut cursor = left;
    for c in chars {
        for stroke in glyph(c).unwrap_or_default() {
            strokes.push(
                stroke
                    .iter()
                    .map(|&(gx, gy)| {
                        Point::new(
                            gx.mul_add(glyph_width, cursor),
                            (0.5 - gy).mul_add(size, center.y),
                        )
                    })
                    .collect(),
            );
        }
        cursor += advance;
    }
    strokes
}

/// Lay out `text` as one polyline with pen-up markers between strokes.
#[must_use]
pub fn text(text: &str, font_size: f64, letter_spacing: f64, center: Point) -> Polyline {
    Polyline::from_strokes(text_strokes(text, font_size, letter_spacing, center))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ORIGIN: Point = Point::new(0.0, 0.0);

    #[test]
    fn font_covers_letters_digits_dash_and_space() {
        for c in ('A'..='Z').chain('0'..='9').chain(['-', ' ']) {
            assert!(glyph(c).is_some(), "missing {c:?}");
        }
        assert!(glyph('?').is_none());
        assert!(glyph('a').is_none());
    }

    #[test]
    fn single_glyph_is_centered_and_y_up() {
        let strokes = text_strokes("I", 1.0, 0.0, ORIGIN);
        assert_eq!(strokes.len(), 3);
        let stem = strokes[0].points();
        // Top of the glyph box is +Y.
        assert!(stem[0].x.abs() < 1e-9);
        assert!((stem[0].y - 0.5).abs() < 1e-9);
        assert!((stem[1].y + 0.5).abs() < 1e-9);
    }

    #[test]
    fn lowercase_is_uppercased() {
        assert_eq!(
            text_strokes("hi", 0.3, 0.05, ORIGIN),
            text_strokes("HI", 0.3, 0.05, ORIGIN)
        );
    }

    #[test]
    fn string_is_symmetric_about_center() {
        let center = Point::new(2.0, -1.0);
        let strokes = text_strokes("--", 0.5, 0.1, center);
        let xs: Vec<f64> = strokes
            .iter()
            .flat_map(|s| s.points().iter().map(|p| p.x))
            .collect();
        let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((f64::midpoint(min, max) - 2.0).abs() < 1e-9);
        assert!(strokes.iter().flat_map(|s| s.points()).all(|p| (p.y + 1.0).abs() < 1e-9));
    }

    #[test]
    fn space_and_unknown_characters_advance_without_strokes() {
        let plain = text_strokes("AB", 1.0, 0.0, ORIGIN);
        let spaced = text_strokes("A B", 1.0, 0.0, ORIGIN);
        let unknown = text_strokes("A?B", 1.0, 0.0, ORIGIN);
        assert_eq!(plain.len(), 4);
        assert_eq!(spaced.len(), 4);
        assert_eq!(spaced, unknown);

        // The B in "A B" sits one full advance further right than in "AB".
        let b_plain = plain[2].points()[0].x;
        let b_spaced = spaced[2].points()[0].x;
        assert!((b_spaced - b_plain - 0.35).abs() < 1e-9);
    }

    #[test]
    fn joined_text_separates_strokes_with_breaks() {
        let path = text("HI", 0.3, 0.05, ORIGIN);
        let breaks = path.points().iter().filter(|p| p.is_break()).count();
        assert_eq!(breaks, 5);
        assert_eq!(path.strokes().len(), 6);
    }

    #[test]
    fn empty_text_is_empty() {
        assert!(text("", 0.3, 0.05, ORIGIN).is_empty());
        assert!(text("   ", 0.3, 0.05, ORIGIN).is_empty());
    }
}
