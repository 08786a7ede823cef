//! Glyph outlines: sets of closed polygons centred on their own origin.

use glam::Vec2;

/// A single closed polygon. The last point implicitly joins back up with the first.
pub type Contour = Vec<Vec2>;

/// The smallest number of points that can enclose any area.
pub const MIN_CONTOUR_POINTS: usize = 3;

/// Below this distance 2 points are considered to be the same point.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// One or more closed polygons approximating a glyph's silhouette.
///
/// Always re-centred so that the mean of all its vertices is at `(0, 0)`. Every later transform
/// (translation to a body's position, rotation by its angle) is applied around that origin.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphOutline {
    /// The polygons, each with at least [`MIN_CONTOUR_POINTS`] points.
    contours: Vec<Contour>,
}

impl GlyphOutline {
    /// Build an outline from raw contours.
    ///
    /// Contours that are explicitly closed (their last point repeats their first) have the
    /// duplicate removed, and contours with fewer than 3 points are dropped. Returns `None` when
    /// nothing usable is left.
    #[must_use]
    pub fn from_contours(contours: Vec<Contour>) -> Option<Self> {
        let usable: Vec<Contour> = contours
            .into_iter()
            .map(Self::open_contour)
            .filter(|contour| contour.len() >= MIN_CONTOUR_POINTS)
            .collect();

        if usable.is_empty() {
            return None;
        }

        let mut outline = Self { contours: usable };
        outline.recentre();
        Some(outline)
    }

    /// A plain axis-aligned rectangle centred on the origin.
    #[must_use]
    pub fn rectangle(width: f32, height: f32) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self {
            contours: vec![vec![
                Vec2::new(-half_width, -half_height),
                Vec2::new(half_width, -half_height),
                Vec2::new(half_width, half_height),
                Vec2::new(-half_width, half_height),
            ]],
        }
    }

    /// The closed polygons that make up this outline.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Total number of vertices across all contours.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// The mean of every vertex. For an outline built by this module it's always (near) zero.
    #[must_use]
    pub fn centroid(&self) -> Vec2 {
        Self::vertex_mean(&self.contours)
    }

    /// The area enclosed by the outline.
    ///
    /// Signed areas are summed before taking the absolute value, so a hole wound in the opposite
    /// direction to its outer contour (as fonts do) is subtracted.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.contours
            .iter()
            .map(|contour| Self::signed_area(contour))
            .sum::<f32>()
            .abs()
    }

    /// The minimum and maximum corners of the outline's axis-aligned bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        self.contours.iter().flatten().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        )
    }

    /// Shoelace formula.
    fn signed_area(contour: &[Vec2]) -> f32 {
        let Some(last) = contour.last() else {
            return 0.0;
        };
        let mut previous = *last;
        let mut twice_area = 0.0;
        for point in contour {
            twice_area += previous.perp_dot(*point);
            previous = *point;
        }
        twice_area / 2.0
    }

    /// Translate every vertex by the negated vertex mean.
    fn recentre(&mut self) {
        let centroid = Self::vertex_mean(&self.contours);
        for point in self.contours.iter_mut().flatten() {
            *point -= centroid;
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::as_conversions,
        reason = "Glyph outlines have at most a few thousand points"
    )]
    fn vertex_mean(contours: &[Contour]) -> Vec2 {
        let count = contours.iter().map(Vec::len).sum::<usize>();
        if count == 0 {
            return Vec2::ZERO;
        }
        let sum = contours.iter().flatten().fold(Vec2::ZERO, |sum, point| sum + *point);
        sum / count as f32
    }

    /// Remove an explicit closing point, the polygon is always treated as closed anyway.
    fn open_contour(mut contour: Contour) -> Contour {
        while contour.len() > 1 {
            let (Some(first), Some(last)) = (contour.first(), contour.last()) else {
                break;
            };
            if first.distance(*last) > COINCIDENT_EPSILON {
                break;
            }
            contour.pop();
        }
        contour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_is_centred() {
        let outline = GlyphOutline::rectangle(6.0, 10.0);
        assert_eq!(outline.vertex_count(), 4);
        assert!(outline.centroid().length() < 1e-6);
        assert!((outline.area() - 60.0).abs() < 1e-4);
    }

    #[test]
    fn recentres_offset_contours() {
        let outline = GlyphOutline::from_contours(vec![vec![
            Vec2::new(100.0, 100.0),
            Vec2::new(110.0, 100.0),
            Vec2::new(110.0, 120.0),
            Vec2::new(100.0, 120.0),
        ]])
        .unwrap();
        assert!(outline.centroid().length() < 1e-4);
        let (min, max) = outline.bounding_box();
        assert!((min.x + 5.0).abs() < 1e-4);
        assert!((max.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn drops_explicit_closing_point() {
        let outline = GlyphOutline::from_contours(vec![vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 0.0),
        ]])
        .unwrap();
        assert_eq!(outline.vertex_count(), 3);
    }

    #[test]
    fn rejects_degenerate_contours() {
        let maybe_outline = GlyphOutline::from_contours(vec![
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
            vec![Vec2::new(5.0, 5.0)],
        ]);
        assert!(maybe_outline.is_none());
    }

    #[test]
    fn holes_subtract_from_area() {
        let outer = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        let hole = vec![
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 8.0),
            Vec2::new(8.0, 8.0),
            Vec2::new(8.0, 2.0),
        ];
        let outline = GlyphOutline::from_contours(vec![outer, hole]).unwrap();
        assert!((outline.area() - 64.0).abs() < 1e-3);
    }
}
