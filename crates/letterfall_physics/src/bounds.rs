//! The rectangle that bodies are confined to.

/// The simulation region, tied to the size of the drawing surface.
///
/// Only the walls and the floor confine bodies. There's no ceiling, bodies spawn above the top
/// edge and can be thrown back up past it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[expect(
    clippy::exhaustive_structs,
    reason = "It's very unlikely that a rectangle is going to have any more fields added to it"
)]
pub struct WorldBounds {
    /// Width in surface pixels
    pub width: f32,
    /// Height in surface pixels
    pub height: f32,
}

impl WorldBounds {
    /// Instantiate
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether there's any area to simulate in.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// The allowed range of x for the centre of a body with the given half extent.
    ///
    /// If the world is narrower than the body the range collapses to the world's centre line.
    #[must_use]
    pub fn horizontal_range(&self, half_extent: f32) -> (f32, f32) {
        let min = half_extent;
        let max = self.width - half_extent;
        if min > max {
            let centre = self.width / 2.0;
            return (centre, centre);
        }
        (min, max)
    }

    /// The largest y for the centre of a body with the given half extent.
    #[must_use]
    pub fn floor(&self, half_extent: f32) -> f32 {
        self.height - half_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_world_collapses_to_centre() {
        let bounds = WorldBounds::new(10.0, 100.0);
        assert_eq!(bounds.horizontal_range(20.0), (5.0, 5.0));
        assert_eq!(bounds.horizontal_range(2.0), (2.0, 8.0));
    }

    #[test]
    fn floor_is_measured_from_the_bottom() {
        let bounds = WorldBounds::new(400.0, 600.0);
        assert!((bounds.floor(25.0) - 575.0).abs() < f32::EPSILON);
        assert!(bounds.has_area());
        assert!(!WorldBounds::default().has_area());
    }
}
