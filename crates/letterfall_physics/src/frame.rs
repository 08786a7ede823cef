//! One call per displayed frame: step the simulation, then render it.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::clock::FrameClock;
use crate::config::SimulationConfig;
use crate::outline::provider::GlyphOutlineProvider;
use crate::outline::source::OutlineSource;
use crate::particle::BodyId;
use crate::render::RenderOptions;
use crate::simulation::Simulation;

/// Owns everything needed to produce frames. The host supplies timestamps, spawn events and a
/// canvas.
#[derive(Debug)]
#[non_exhaustive]
pub struct FrameDriver<P: GlyphOutlineProvider = OutlineSource> {
    /// The live letters.
    pub simulation: Simulation,
    /// Where letter shapes come from.
    outlines: P,
    /// Converts timestamps into deltas.
    clock: FrameClock,
    /// How frames are drawn.
    pub render_options: RenderOptions,
    /// Whether the driver still accepts frames.
    is_running: bool,
}

impl<P: GlyphOutlineProvider> FrameDriver<P> {
    /// Instantiate
    pub fn new(simulation: Simulation, outlines: P, render_options: RenderOptions) -> Self {
        let clock = FrameClock::new(simulation.config.time_step);
        Self {
            simulation,
            outlines,
            clock,
            render_options,
            is_running: true,
        }
    }

    /// Use a custom clock, for example one with a different clamp on long deltas.
    #[must_use]
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Produce one frame. Returns `false`, without touching the canvas, once the driver has been
    /// shut down.
    pub fn frame<C: Canvas + ?Sized>(&mut self, timestamp: Duration, canvas: &mut C) -> bool {
        if !self.is_running {
            return false;
        }

        let delta = self.clock.tick(timestamp);
        self.simulation.step(delta);
        crate::render::render(&self.simulation, canvas, &self.render_options);
        true
    }

    /// The spawn timer fired.
    pub fn spawn(&mut self) -> Option<BodyId> {
        if !self.is_running {
            return None;
        }
        self.simulation.spawn_random(&self.outlines)
    }

    /// The surface changed size. Takes effect from the next step.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.simulation.resize(width, height);
    }

    /// Apply new simulation and render config to the running animation.
    pub fn reconfigure(&mut self, simulation: SimulationConfig, render_options: RenderOptions) {
        self.clock.set_time_step(simulation.time_step);
        self.simulation.reconfigure(simulation);
        self.render_options = render_options;
    }

    /// Stop producing frames and spawning letters.
    pub fn shutdown(&mut self) {
        tracing::debug!("Frame driver shutting down");
        self.is_running = false;
    }

    /// Whether frames are still being produced.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.is_running
    }

    /// The outline provider, for example to hand it a font that has finished loading.
    pub const fn outlines_mut(&mut self) -> &mut P {
        &mut self.outlines
    }

    /// The outline provider.
    #[must_use]
    pub const fn outlines(&self) -> &P {
        &self.outlines
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::canvas::{Colour, TextStyle};
    use crate::geometry::Contour;
    use crate::outline::table::TableOutlines;

    #[derive(Default)]
    struct CountingCanvas {
        clears: usize,
        paths: usize,
    }

    impl Canvas for CountingCanvas {
        fn width(&self) -> f32 {
            400.0
        }
        fn height(&self) -> f32 {
            600.0
        }
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn translate(&mut self, _offset: Vec2) {}
        fn rotate(&mut self, _angle: f32) {}
        fn scale(&mut self, _factor: f32) {}
        fn clear(&mut self, _colour: Colour) {
            self.clears += 1;
        }
        fn fill_rect(&mut self, _position: Vec2, _size: Vec2, _colour: Colour) {}
        fn fill_path(&mut self, _contours: &[Contour], _colour: Colour) {
            self.paths += 1;
        }
        fn fill_text(&mut self, _character: char, _style: &TextStyle, _colour: Colour) {}
    }

    fn driver() -> FrameDriver<TableOutlines> {
        let mut config = SimulationConfig::metric();
        config.seed = Some(3);
        let simulation = Simulation::new(config, 400.0, 600.0);
        FrameDriver::new(simulation, TableOutlines, RenderOptions::default())
    }

    #[test]
    fn spawned_letters_appear_on_the_next_frame() {
        let mut driver = driver();
        let mut canvas = CountingCanvas::default();

        assert!(driver.frame(Duration::ZERO, &mut canvas));
        assert_eq!(canvas.paths, 0);

        driver.spawn().unwrap();
        assert!(driver.frame(Duration::from_millis(16), &mut canvas));
        assert_eq!(canvas.paths, 1);
        assert_eq!(canvas.clears, 2);
    }

    #[test]
    fn first_frame_does_not_move_anything() {
        let mut driver = driver();
        driver.spawn().unwrap();
        let before = driver.simulation.particles[0].position;
        driver.frame(Duration::from_secs(100), &mut CountingCanvas::default());
        assert_eq!(driver.simulation.particles[0].position, before);
    }

    #[test]
    fn shutdown_stops_frames_and_spawns() {
        let mut driver = driver();
        driver.shutdown();
        let mut canvas = CountingCanvas::default();
        assert!(!driver.frame(Duration::ZERO, &mut canvas));
        assert_eq!(canvas.clears, 0);
        assert!(driver.spawn().is_none());
        assert!(!driver.is_running());
    }
}
