//! A single falling letter.

use std::sync::Arc;

use glam::Vec2;

use crate::bounds::WorldBounds;
use crate::canvas::Colour;
use crate::config::SimulationConfig;
use crate::errors::BodyError;
use crate::geometry::GlyphOutline;

/// Identifies a body for its whole lifetime. Ids only ever increase, so they also record the
/// order in which bodies were created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[expect(
    clippy::exhaustive_structs,
    reason = "It's just a newtype around the counter"
)]
pub struct BodyId(pub u64);

/// One falling glyph.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Particle {
    /// Unique, creation-ordered id
    pub id: BodyId,
    /// The character this body is drawn as
    pub character: char,
    /// Current size in pixels, between `start_size` and `max_size`
    pub size: f32,
    /// Size at spawn, which is also the size the outline was made at
    pub start_size: f32,
    /// The size growth stops at
    pub max_size: f32,
    /// Centre of the body in surface pixels
    pub position: Vec2,
    /// Pixels per time step unit
    pub velocity: Vec2,
    /// Rotation in radians
    pub angle: f32,
    /// Radians per time step unit
    pub angular_velocity: f32,
    /// Density multiplied by the outline's area
    pub mass: f32,
    /// Fill colour
    pub colour: Colour,
    /// The glyph's silhouette, centred on the body's position
    pub outline: Arc<GlyphOutline>,
}

#[bon::bon]
impl Particle {
    /// Create a body from an already computed outline.
    ///
    /// # Errors
    /// If the size isn't usable or the outline encloses no area.
    #[builder]
    pub fn new(
        id: BodyId,
        character: char,
        outline: GlyphOutline,
        size: f32,
        max_size: Option<f32>,
        position: Vec2,
        #[builder(default)] velocity: Vec2,
        #[builder(default)] angular_velocity: f32,
        #[builder(default = 0.001)] density: f32,
        #[builder(default = crate::canvas::WHITE)] colour: Colour,
    ) -> Result<Self, BodyError> {
        if !size.is_finite() || size <= 0.0 {
            return crate::errors::InvalidSizeSnafu { character, size }.fail();
        }

        let area = outline.area();
        if !area.is_finite() || area <= f32::EPSILON {
            return crate::errors::NoAreaSnafu { character, area }.fail();
        }

        Ok(Self {
            id,
            character,
            size,
            start_size: size,
            max_size: max_size.unwrap_or(size).max(size),
            position,
            velocity,
            angle: 0.0,
            angular_velocity,
            mass: density * area,
            colour,
            outline: Arc::new(outline),
        })
    }

    /// Half of the body's size. The walls and floor treat a body as a square of side `size`.
    ///
    /// This is not the silhouette's extent. A font glyph is centred on its vertex mean and is
    /// rarely as tall or as wide as `size`, so at rest it can hover a little above the floor, and
    /// a wide glyph like 'W' can poke slightly past a wall.
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        self.size / 2.0
    }

    /// How much bigger the body is now than when its outline was made.
    #[must_use]
    pub fn render_scale(&self) -> f32 {
        self.size / self.start_size
    }

    /// Semi-implicit Euler: gravity into velocity, damping, then velocity into position.
    pub fn integrate(&mut self, config: &SimulationConfig, delta: f32) {
        self.velocity.y += config.gravity * delta;

        let damping = config.air_resistance_for(delta);
        self.velocity *= damping;
        self.angular_velocity *= damping;

        self.position += self.velocity * delta;
        self.angle += self.angular_velocity * delta;
    }

    /// Keep the body between the side walls, bouncing off them.
    pub fn resolve_walls(&mut self, bounds: &WorldBounds, wall_bounce: f32) {
        let (min_x, max_x) = bounds.horizontal_range(self.half_extent());
        if self.position.x < min_x {
            self.position.x = min_x;
            self.velocity.x = -self.velocity.x * wall_bounce;
        } else if self.position.x > max_x {
            self.position.x = max_x;
            self.velocity.x = -self.velocity.x * wall_bounce;
        }
    }

    /// Keep the body above the floor, bouncing and sliding with friction.
    ///
    /// Returns whether the body touched the floor.
    pub fn resolve_floor(
        &mut self,
        bounds: &WorldBounds,
        config: &SimulationConfig,
        delta: f32,
    ) -> bool {
        let floor = bounds.floor(self.half_extent());
        if self.position.y <= floor {
            return false;
        }

        self.position.y = floor;
        self.velocity.y = -self.velocity.y * config.restitution;
        self.velocity.x *= config.floor_friction;
        self.angular_velocity *= config.floor_friction;

        let resting_speed = config.rest_speed + config.gravity * delta;
        if self.velocity.y.abs() < resting_speed {
            self.velocity.y = 0.0;
        }

        true
    }

    /// Grow towards the maximum size without overshooting it.
    pub fn grow(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.size = (self.size + amount).min(self.max_size);
    }
}
