//! The live set of falling letters and the rules that move them.

use std::collections::VecDeque;

use glam::Vec2;
use palette::FromColor as _;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use snafu::ResultExt as _;

use crate::bounds::WorldBounds;
use crate::canvas::{Colour, WHITE};
use crate::config::SimulationConfig;
use crate::errors::SpawnError;
use crate::outline::provider::GlyphOutlineProvider;
use crate::particle::{BodyId, Particle};

/// Owns every live letter, the world they live in and the random number generator that
/// decides where new ones appear.
#[derive(Debug)]
#[non_exhaustive]
pub struct Simulation {
    /// The config for the simulation.
    pub config: SimulationConfig,
    /// The walls and floor.
    pub bounds: WorldBounds,
    /// All the live letters, oldest first.
    pub particles: VecDeque<Particle>,
    /// The id that the next spawned letter will get.
    next_id: u64,
    /// Randomness for spawning.
    rng: StdRng,
}

impl Simulation {
    /// Instantiate
    #[must_use]
    pub fn new(config: SimulationConfig, width: f32, height: f32) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            bounds: WorldBounds::new(width, height),
            particles: VecDeque::new(),
            next_id: 0,
            rng,
        }
    }

    /// Spawn a letter above the top edge at a random position and size.
    ///
    /// A letter that can't be made, because there's no outline for it or the outline is
    /// unusable, is silently skipped.
    pub fn spawn<P: GlyphOutlineProvider + ?Sized>(
        &mut self,
        character: char,
        provider: &P,
    ) -> Option<BodyId> {
        match self.try_spawn(character, provider, None) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::debug!("Skipped spawning '{character}': {error}");
                None
            }
        }
    }

    /// Spawn a random character from the configured alphabet.
    pub fn spawn_random<P: GlyphOutlineProvider + ?Sized>(
        &mut self,
        provider: &P,
    ) -> Option<BodyId> {
        let alphabet: Vec<char> = self.config.alphabet.chars().collect();
        if alphabet.is_empty() {
            tracing::debug!("Alphabet is empty, nothing to spawn");
            return None;
        }
        let index = self.rng.gen_range(0..alphabet.len());
        let character = *alphabet.get(index)?;
        self.spawn(character, provider)
    }

    /// Spawn a letter at an exact position with an exact velocity, at the minimum size.
    ///
    /// # Errors
    /// If there's no usable outline for the character.
    pub fn spawn_at<P: GlyphOutlineProvider + ?Sized>(
        &mut self,
        character: char,
        provider: &P,
        position: Vec2,
        velocity: Vec2,
    ) -> Result<BodyId, SpawnError> {
        self.try_spawn(character, provider, Some((position, velocity)))
    }

    /// Shared spawning logic. Without a placement the letter gets a random size, position,
    /// drift and spin.
    fn try_spawn<P: GlyphOutlineProvider + ?Sized>(
        &mut self,
        character: char,
        provider: &P,
        placement: Option<(Vec2, Vec2)>,
    ) -> Result<BodyId, SpawnError> {
        if !self.bounds.has_area() {
            return Err(SpawnError::EmptyWorld);
        }
        if self.config.population_cap == 0 {
            return Err(SpawnError::NoRoom);
        }

        let size = match placement {
            Some(_) => self.config.min_size,
            None => self.random_between(self.config.min_size, self.config.max_size),
        };
        let outline = provider
            .outline(character, size)
            .context(crate::errors::OutlineSnafu)?;

        let (position, velocity, spin) = match placement {
            Some((position, velocity)) => (position, velocity, 0.0),
            None => {
                let half = size / 2.0;
                let (min_x, max_x) = self
                    .bounds
                    .horizontal_range(half + self.config.spawn_padding);
                let x = self.random_between(min_x, max_x);
                let drift = self.random_between(
                    -self.config.initial_horizontal_speed,
                    self.config.initial_horizontal_speed,
                );
                let spin =
                    self.random_between(-self.config.initial_spin, self.config.initial_spin);
                (Vec2::new(x, -self.config.spawn_height), Vec2::new(drift, 0.0), spin)
            }
        };

        let colour = self.colour();
        let id = BodyId(self.next_id);
        let particle = Particle::builder()
            .id(id)
            .character(character)
            .outline(outline)
            .size(size)
            .max_size(self.config.growth.max_size)
            .position(position)
            .velocity(velocity)
            .angular_velocity(spin)
            .density(self.config.density)
            .colour(colour)
            .build()
            .context(crate::errors::BodySnafu)?;

        self.next_id += 1;
        tracing::trace!(
            "Spawned '{character}' ({id:?}) at {position} with size {size:.1}"
        );
        self.particles.push_back(particle);
        self.evict();

        Ok(id)
    }

    /// A uniformly random number in the inclusive range, tolerating reversed or empty ranges.
    fn random_between(&mut self, low: f32, high: f32) -> f32 {
        if low >= high || low.is_nan() || high.is_nan() {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// White, unless random colours are enabled.
    fn colour(&mut self) -> Colour {
        if !self.config.random_colours {
            return WHITE;
        }

        let hue = self.rng.gen_range(0.0..360.0_f32);
        let hsl: palette::Hsl = palette::Hsl::new(hue, 0.8, 0.65);
        let rgb: palette::Srgb = palette::Srgb::from_color(hsl);
        (rgb.red, rgb.green, rgb.blue, 1.0)
    }

    /// Advance every letter by `delta`, in the config's time step units.
    ///
    /// The order is: evict, integrate, letter-to-letter collisions (when enabled), growth,
    /// walls, then floor. The boundary passes come last so that nothing else can leave a
    /// letter outside the world.
    pub fn step(&mut self, delta: f32) {
        self.evict();
        if delta <= 0.0 || !delta.is_finite() {
            return;
        }

        for particle in &mut self.particles {
            particle.integrate(&self.config, delta);
        }

        if self.config.pairwise_collisions {
            crate::collision::resolve_pairs(&mut self.particles, self.config.restitution);
        }

        let growth = self.config.growth_for(delta);
        for particle in &mut self.particles {
            particle.grow(growth);
            particle.resolve_walls(&self.bounds, self.config.wall_bounce);
            particle.resolve_floor(&self.bounds, &self.config, delta);
        }
    }

    /// Remove the oldest letters until the population is within the cap. Returns how many
    /// were removed.
    pub fn evict(&mut self) -> usize {
        let mut removed = 0;
        while self.particles.len() > self.config.population_cap {
            if let Some(oldest) = self.particles.pop_front() {
                tracing::trace!("Evicted '{}' ({:?})", oldest.character, oldest.id);
                removed += 1;
            }
        }
        removed
    }

    /// The surface changed size. Letters outside the new bounds are pulled back in by the
    /// next step.
    pub fn resize(&mut self, width: f32, height: f32) {
        tracing::debug!("Resizing simulation to {width}x{height}");
        self.bounds = WorldBounds::new(width, height);
    }

    /// Replace the config, keeping all the live letters.
    pub fn reconfigure(&mut self, config: SimulationConfig) {
        if config.seed != self.config.seed {
            if let Some(seed) = config.seed {
                self.rng = StdRng::seed_from_u64(seed);
            }
        }
        self.config = config;
        self.evict();
    }

    /// Remove every letter.
    pub fn reset(&mut self) {
        tracing::debug!("Resetting simulation");
        self.particles.clear();
    }

    /// Whether the world has any area for letters to exist in.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.bounds.has_area()
    }

    /// The number of live letters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether there are no live letters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::table::TableOutlines;

    fn simulation() -> Simulation {
        let mut config = SimulationConfig::metric();
        config.seed = Some(1);
        Simulation::new(config, 400.0, 600.0)
    }

    #[test]
    fn spawns_above_the_top_edge() {
        let mut simulation = simulation();
        let id = simulation.spawn('A', &TableOutlines).unwrap();
        let particle = &simulation.particles[0];

        assert_eq!(particle.id, id);
        assert!((particle.position.y + 50.0).abs() < f32::EPSILON);
        assert!(particle.position.x >= particle.half_extent());
        assert!(particle.position.x <= 400.0 - particle.half_extent());
        assert!(particle.size >= 30.0 && particle.size <= 80.0);
        assert_eq!(particle.velocity, Vec2::ZERO);
    }

    #[test]
    fn ids_increase() {
        let mut simulation = simulation();
        let first = simulation.spawn('A', &TableOutlines).unwrap();
        let second = simulation.spawn('B', &TableOutlines).unwrap();
        assert!(second > first);
    }

    #[test]
    fn zero_sized_world_spawns_nothing() {
        let mut simulation = Simulation::new(SimulationConfig::metric(), 0.0, 0.0);
        assert!(simulation.spawn('A', &TableOutlines).is_none());
        assert!(!simulation.is_ready());
        assert!(simulation.is_empty());
    }

    #[test]
    fn zero_cap_spawns_nothing() {
        let mut simulation = simulation();
        simulation.config.population_cap = 0;
        assert!(simulation.spawn('A', &TableOutlines).is_none());
        assert!(matches!(
            simulation.spawn_at('A', &TableOutlines, Vec2::new(50.0, 50.0), Vec2::ZERO),
            Err(SpawnError::NoRoom)
        ));
        assert!(simulation.is_empty());
    }

    #[test]
    fn same_seed_same_spawns() {
        let mut first = simulation();
        let mut second = simulation();
        for _ in 0..5 {
            first.spawn_random(&TableOutlines);
            second.spawn_random(&TableOutlines);
        }
        let positions = |simulation: &Simulation| -> Vec<(char, Vec2)> {
            simulation
                .particles
                .iter()
                .map(|particle| (particle.character, particle.position))
                .collect()
        };
        assert_eq!(positions(&first), positions(&second));
    }

    #[test]
    fn random_colours_are_opaque() {
        let mut simulation = simulation();
        simulation.config.random_colours = true;
        simulation.spawn('Q', &TableOutlines).unwrap();
        let colour = simulation.particles[0].colour;
        assert!((colour.3 - 1.0).abs() < f32::EPSILON);
        assert_ne!(colour, WHITE);
    }

    #[test]
    fn reset_removes_everything() {
        let mut simulation = simulation();
        simulation.spawn('A', &TableOutlines);
        simulation.spawn('B', &TableOutlines);
        simulation.reset();
        assert_eq!(simulation.len(), 0);
    }

    #[test]
    fn lowering_the_cap_evicts_on_reconfigure() {
        let mut simulation = simulation();
        for _ in 0..10 {
            simulation.spawn('A', &TableOutlines);
        }
        let mut config = simulation.config.clone();
        config.population_cap = 3;
        simulation.reconfigure(config);
        assert_eq!(simulation.len(), 3);
        assert_eq!(simulation.particles[0].id, BodyId(7));
    }
}
