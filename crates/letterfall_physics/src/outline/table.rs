//! Hand-authored polygons for a few letters, and a rectangle for everything else.
//!
//! Needs no font data and can't fail, so it's what the simulation falls back to whenever a real
//! font isn't available.

use glam::Vec2;

use crate::errors::OutlineError;
use crate::geometry::GlyphOutline;

/// A glyph's width as a fraction of its size (its height).
pub const WIDTH_TO_SIZE_RATIO: f32 = 0.6;

/// Unit-square polygon for 'A'. (0, 0) is the top-left, y points down.
const LETTER_A: &[(f32, f32)] = &[
    (0.5, 0.0),
    (1.0, 1.0),
    (0.78, 1.0),
    (0.66, 0.72),
    (0.34, 0.72),
    (0.22, 1.0),
    (0.0, 1.0),
];

/// Unit-square polygon for 'O', a 12-sided ellipse.
const LETTER_O: &[(f32, f32)] = &[
    (0.5, 0.0),
    (0.75, 0.067),
    (0.933, 0.25),
    (1.0, 0.5),
    (0.933, 0.75),
    (0.75, 0.933),
    (0.5, 1.0),
    (0.25, 0.933),
    (0.067, 0.75),
    (0.0, 0.5),
    (0.067, 0.25),
    (0.25, 0.067),
];

/// Unit-square polygon for 'M'.
const LETTER_M: &[(f32, f32)] = &[
    (0.0, 1.0),
    (0.0, 0.0),
    (0.2, 0.0),
    (0.5, 0.45),
    (0.8, 0.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.8, 1.0),
    (0.8, 0.4),
    (0.5, 0.8),
    (0.2, 0.4),
    (0.2, 1.0),
];

/// The table-driven outline strategy.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct TableOutlines;

impl TableOutlines {
    /// Instantiate
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The hand-authored unit polygon for a character, if there is one.
    #[must_use]
    pub const fn unit_polygon(character: char) -> Option<&'static [(f32, f32)]> {
        match character {
            'A' => Some(LETTER_A),
            'O' => Some(LETTER_O),
            'M' => Some(LETTER_M),
            _ => None,
        }
    }

    /// The width and height of a glyph of the given size.
    #[must_use]
    pub fn dimensions(size: f32) -> Vec2 {
        Vec2::new(size * WIDTH_TO_SIZE_RATIO, size)
    }

    /// Build the outline. Unlike the trait method this can't fail.
    #[must_use]
    pub fn outline_for(character: char, size: f32) -> GlyphOutline {
        let dimensions = Self::dimensions(size);
        let Some(unit) = Self::unit_polygon(character) else {
            return GlyphOutline::rectangle(dimensions.x, dimensions.y);
        };

        let scaled = unit
            .iter()
            .map(|&(x, y)| (Vec2::new(x, y) - Vec2::splat(0.5)) * dimensions)
            .collect();

        GlyphOutline::from_contours(vec![scaled])
            .unwrap_or_else(|| GlyphOutline::rectangle(dimensions.x, dimensions.y))
    }
}

impl super::provider::GlyphOutlineProvider for TableOutlines {
    fn outline(&self, character: char, size: f32) -> Result<GlyphOutline, OutlineError> {
        Ok(Self::outline_for(character, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::provider::GlyphOutlineProvider as _;

    #[test]
    fn unknown_characters_are_rectangles() {
        let outline = TableOutlines.outline('Q', 50.0).unwrap();
        assert_eq!(outline.contours().len(), 1);
        assert_eq!(outline.vertex_count(), 4);
        let (min, max) = outline.bounding_box();
        assert!((max.x - min.x - 30.0).abs() < 1e-4);
        assert!((max.y - min.y - 50.0).abs() < 1e-4);
        assert!(outline.centroid().length() < 1e-4);
    }

    #[test]
    fn authored_letters_fit_their_box() {
        for character in ['A', 'O', 'M'] {
            let outline = TableOutlines.outline(character, 40.0).unwrap();
            assert!(outline.vertex_count() > 4, "'{character}' fell back to a rectangle");
            assert!(outline.centroid().length() < 1e-3);
            let (min, max) = outline.bounding_box();
            assert!(max.x - min.x <= 24.0 + 1e-3);
            assert!(max.y - min.y <= 40.0 + 1e-3);
            assert!(outline.area() > 0.0);
        }
    }
}
