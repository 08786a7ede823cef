//! Running the simulation without a terminal, on a fixed 60fps clock. Useful for trying out
//! configs, making screenshots and for testing.

use std::sync::Arc;

use color_eyre::eyre::Result;
use letterfall_physics::{
    FrameDriver, GlyphOutlineProvider, OutlineSource, Simulation, TableOutlines,
};

use crate::pixel_canvas::PixelCanvas;

/// The simulated frame rate.
const FRAMES_PER_SECOND: f64 = 60.0;

/// How far above the floor, in pixels, a letter can be and still count as resting on it.
const RESTING_TOLERANCE: f32 = 0.5;

/// What to simulate.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HeadlessOptions {
    /// Number of frames
    pub frames: u32,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Where to save the final frame.
    pub snapshot: Option<std::path::PathBuf>,
    /// A font to use instead of the configured one.
    pub font: Option<std::path::PathBuf>,
}

impl HeadlessOptions {
    /// Instantiate
    #[must_use]
    pub const fn new(frames: u32, width: u32, height: u32) -> Self {
        Self {
            frames,
            width,
            height,
            snapshot: None,
            font: None,
        }
    }
}

impl From<&crate::cli_args::CliArgs> for HeadlessOptions {
    fn from(cli_args: &crate::cli_args::CliArgs) -> Self {
        Self {
            frames: cli_args.frames,
            width: cli_args.width,
            height: cli_args.height,
            snapshot: cli_args.snapshot.clone(),
            font: cli_args.font.clone(),
        }
    }
}

/// What happened during a headless run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HeadlessReport {
    /// Frames simulated
    pub frames: u32,
    /// Letters successfully spawned
    pub spawned: usize,
    /// Letters still alive at the end
    pub live: usize,
    /// Live letters lying still on the floor
    pub resting: usize,
    /// Ids of the live letters, oldest first.
    pub live_ids: Vec<u64>,
    /// Where the final frame was saved.
    pub snapshot: Option<std::path::PathBuf>,
}

/// Simulate and optionally save the last frame as a PNG.
///
/// # Errors
/// When the snapshot can't be saved.
pub async fn run(
    config: crate::config::main::Config,
    options: HeadlessOptions,
) -> Result<HeadlessReport> {
    let font_path = options.font.clone().or_else(|| config.font_path.clone());
    let font_result = crate::fonts::load(font_path, config.font_sample_length).await;
    if let Err(error) = &font_result {
        tracing::info!("Using built-in letter shapes: {error}");
    }

    let text_outlines: Arc<dyn GlyphOutlineProvider + Send + Sync> = match &font_result {
        Ok(font) => Arc::new(font.clone()),
        Err(_) => Arc::new(TableOutlines::new()),
    };
    let mut outlines = OutlineSource::loading();
    outlines.finish_loading(font_result);

    let width = usize::try_from(options.width)?;
    let height = usize::try_from(options.height)?;
    let mut canvas = PixelCanvas::new(width, height).with_text_outlines(text_outlines);

    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Canvas sizes are far smaller than f32's integer precision"
    )]
    let simulation = Simulation::new(
        config.physics.clone(),
        options.width as f32,
        options.height as f32,
    );
    let mut driver = FrameDriver::new(simulation, outlines, config.render.clone());

    let spawn_interval = std::time::Duration::from_millis(config.spawn_interval_ms.max(1));
    let mut next_spawn = std::time::Duration::ZERO;
    let mut spawned = 0;

    tracing::debug!(
        "Simulating {} frames on a {}x{} canvas",
        options.frames,
        options.width,
        options.height
    );
    for frame in 0..options.frames {
        let timestamp = std::time::Duration::from_secs_f64(f64::from(frame) / FRAMES_PER_SECOND);
        while timestamp >= next_spawn {
            if driver.spawn().is_some() {
                spawned += 1;
            }
            next_spawn += spawn_interval;
        }
        driver.frame(timestamp, &mut canvas);
    }
    driver.shutdown();

    if let Some(path) = &options.snapshot {
        let snapshot_canvas = canvas.clone();
        let snapshot_path = path.clone();
        tokio::task::spawn_blocking(move || snapshot_canvas.save_png(&snapshot_path)).await??;
    }

    let simulation = &driver.simulation;
    let resting = simulation
        .particles
        .iter()
        .filter(|particle| {
            let floor = simulation.bounds.floor(particle.half_extent());
            particle.velocity.y.abs() < f32::EPSILON && floor - particle.position.y < RESTING_TOLERANCE
        })
        .count();

    Ok(HeadlessReport {
        frames: options.frames,
        spawned,
        live: simulation.len(),
        resting,
        live_ids: simulation
            .particles
            .iter()
            .map(|particle| particle.id.0)
            .collect(),
        snapshot: options.snapshot,
    })
}
