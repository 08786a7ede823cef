//! All the variables that can be configured for the simulation
//!
//! Nothing here assumes a particular unit scale. What matters is the shape of the integration:
//! velocity is updated from acceleration before position is updated from velocity. The 2
//! presets show the 2 common scales: everything per frame, or everything per second with
//! metres converted to pixels.

/// Earth's gravitational acceleration in metres per second squared.
pub const EARTH_GRAVITY: f32 = 9.8;

/// How many pixels make up a metre in the metric preset.
pub const PIXELS_PER_METRE: f32 = 50.0;

/// The duration of one nominal frame in seconds, at 60 frames per second.
pub const NOMINAL_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// The units that a step's delta is measured in.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TimeStep {
    /// Every frame advances the simulation by exactly 1, whatever the wall-clock time.
    PerFrame,
    /// Deltas are real elapsed seconds.
    #[default]
    Seconds,
}

impl TimeStep {
    /// The length of one nominal frame in this time step's units. Per-step factors like air
    /// resistance are defined per nominal frame.
    #[must_use]
    pub const fn nominal_frame(self) -> f32 {
        match self {
            Self::PerFrame => 1.0,
            Self::Seconds => NOMINAL_FRAME_SECONDS,
        }
    }
}

/// Letters that grow after spawning.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct GrowthConfig {
    /// Size added per nominal frame. 0 disables growth.
    pub rate: f32,
    /// The size at which growth stops. Letters spawned larger than this never grow.
    pub max_size: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            rate: 0.0,
            max_size: 80.0,
        }
    }
}

/// All the config for the simulation
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct SimulationConfig {
    /// The units of a step's delta.
    pub time_step: TimeStep,
    /// Downward acceleration, in pixels per time step unit squared.
    pub gravity: f32,
    /// Fraction of velocity kept per nominal frame, independent of collisions.
    pub air_resistance: f32,
    /// Fraction of vertical velocity kept (sign flipped) after hitting the floor.
    pub restitution: f32,
    /// Fraction of horizontal velocity kept (sign flipped) after hitting a wall.
    pub wall_bounce: f32,
    /// Fraction of horizontal and angular velocity kept after touching the floor.
    pub floor_friction: f32,
    /// Floor bounces slower than this (plus one step's worth of gravity) come to rest.
    pub rest_speed: f32,
    /// The smallest size, in pixels, of a newly spawned letter.
    pub min_size: f32,
    /// The largest size, in pixels, of a newly spawned letter.
    pub max_size: f32,
    /// Growth after spawning.
    pub growth: GrowthConfig,
    /// The maximum number of live letters. The oldest are removed first.
    pub population_cap: usize,
    /// Keep spawned letters at least this far from the side walls.
    pub spawn_padding: f32,
    /// How far above the top edge letters appear.
    pub spawn_height: f32,
    /// The maximum horizontal speed, in either direction, given to new letters.
    pub initial_horizontal_speed: f32,
    /// The maximum angular speed, in radians per time step unit, given to new letters.
    pub initial_spin: f32,
    /// Mass per unit of outline area.
    pub density: f32,
    /// Whether letters collide with each other as well as with the walls and floor.
    pub pairwise_collisions: bool,
    /// Give every letter a random hue instead of drawing them all white.
    pub random_colours: bool,
    /// The characters that random spawns choose from.
    pub alphabet: String,
    /// Seed for the random number generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Seconds-based integration, with Earth's gravity at 50 pixels per metre.
    #[must_use]
    pub fn metric() -> Self {
        Self {
            time_step: TimeStep::Seconds,
            gravity: EARTH_GRAVITY * PIXELS_PER_METRE,
            air_resistance: 0.99,
            restitution: 0.1,
            wall_bounce: 0.5,
            floor_friction: 0.9,
            rest_speed: 20.0,
            min_size: 30.0,
            max_size: 80.0,
            growth: GrowthConfig::default(),
            population_cap: 100,
            spawn_padding: 0.0,
            spawn_height: 50.0,
            initial_horizontal_speed: 0.0,
            initial_spin: 0.0,
            density: 0.001,
            pairwise_collisions: false,
            random_colours: false,
            alphabet: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_owned(),
            seed: None,
        }
    }

    /// Frame-based integration, with gravity as a flat per-frame increment.
    #[must_use]
    pub fn per_frame() -> Self {
        Self {
            time_step: TimeStep::PerFrame,
            gravity: 0.5,
            air_resistance: 0.99,
            restitution: 0.6,
            wall_bounce: 0.8,
            floor_friction: 0.95,
            rest_speed: 0.3,
            initial_horizontal_speed: 2.0,
            ..Self::metric()
        }
    }

    /// The air resistance multiplier for a step of the given delta.
    ///
    /// Defined per nominal frame, so a zero delta applies no damping at all.
    #[must_use]
    pub fn air_resistance_for(&self, delta: f32) -> f32 {
        self.air_resistance
            .powf(delta / self.time_step.nominal_frame())
    }

    /// How much a letter grows in a step of the given delta.
    #[must_use]
    pub fn growth_for(&self, delta: f32) -> f32 {
        self.growth.rate * delta / self.time_step.nominal_frame()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::metric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delta_has_no_damping() {
        let config = SimulationConfig::metric();
        assert!((config.air_resistance_for(0.0) - 1.0).abs() < f32::EPSILON);
        assert!(config.growth_for(0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn one_nominal_frame_applies_the_factor_once() {
        let config = SimulationConfig::per_frame();
        assert!((config.air_resistance_for(1.0) - 0.99).abs() < 1e-6);

        let config = SimulationConfig::metric();
        assert!((config.air_resistance_for(NOMINAL_FRAME_SECONDS) - 0.99).abs() < 1e-5);
    }

    #[test]
    fn per_frame_preset_keeps_metric_sizes() {
        let per_frame = SimulationConfig::per_frame();
        let metric = SimulationConfig::metric();
        assert_eq!(per_frame.time_step, TimeStep::PerFrame);
        assert!((per_frame.min_size - metric.min_size).abs() < f32::EPSILON);
        assert_eq!(per_frame.population_cap, metric.population_cap);
    }
}
