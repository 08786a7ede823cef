//! The live animation: steps and draws falling letters at the configured frame rate, drops a new
//! letter every spawn interval, and reacts to resizes and config changes.

use std::sync::Arc;

use color_eyre::eyre::Result;
use letterfall_physics::{FrameDriver, OutlineSource, Simulation};

use crate::pixel_canvas::PixelCanvas;
use crate::run::Protocol;
use crate::shared_state::SharedState;
use crate::surface::Surface;

/// Everything that changes from frame to frame.
pub(crate) struct Animation {
    /// Physics and rendering of the letters
    driver: FrameDriver<OutlineSource>,
    /// What the letters are drawn onto
    canvas: PixelCanvas,
    /// Where finished frames go
    output: tokio::sync::mpsc::Sender<Surface>,
    /// Target frame rate
    frame_rate: u32,
    /// The time at which the previous frame was rendered.
    last_frame_tick: std::time::Instant,
    /// The animation's time origin, frame timestamps are measured from here.
    started: std::time::Instant,
}

impl Animation {
    /// Instantiate
    fn new(
        config: &crate::config::main::Config,
        tty_size: crate::shared_state::TTYSize,
        output: tokio::sync::mpsc::Sender<Surface>,
    ) -> Self {
        let canvas = PixelCanvas::for_terminal(tty_size.width, tty_size.height);
        let simulation = Simulation::new(
            config.physics.clone(),
            f32::from(tty_size.width),
            f32::from(tty_size.height) * 2.0,
        );
        let driver = FrameDriver::new(simulation, OutlineSource::loading(), config.render.clone());

        Self {
            driver,
            canvas,
            output,
            frame_rate: config.frame_rate.max(1),
            last_frame_tick: std::time::Instant::now(),
            started: std::time::Instant::now(),
        }
    }

    /// Run the animation until the protocol `End` message arrives.
    ///
    /// # Errors
    /// If a frame can't be built.
    pub async fn start(
        state: Arc<SharedState>,
        output: tokio::sync::mpsc::Sender<Surface>,
        font_override: Option<std::path::PathBuf>,
    ) -> Result<()> {
        let config = state.config.read().await.clone();
        let mut protocol_rx = state.protocol_tx.subscribe();
        let mut animation = Self::new(&config, state.get_tty_size().await, output);

        let font_path = font_override.or_else(|| config.font_path.clone());
        let font_load = crate::fonts::load(font_path, config.font_sample_length);
        tokio::pin!(font_load);

        let mut spawn_timer = Self::spawn_timer(config.spawn_interval_ms);

        tracing::debug!("Starting animation loop");
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                () = animation.sleep_until_next_frame_tick() => {
                    animation.render().await?;
                }
                _ = spawn_timer.tick() => {
                    animation.driver.spawn();
                }
                result = &mut font_load, if !animation.driver.outlines().is_settled() => {
                    if let Err(error) = &result {
                        tracing::warn!("Falling back to built-in letter shapes: {error}");
                    }
                    animation.driver.outlines_mut().finish_loading(result);
                }
                result = protocol_rx.recv() => {
                    match result {
                        Ok(Protocol::End)
                        | Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Ok(message) => animation.handle_protocol_message(message, &mut spawn_timer),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Animation missed {skipped} protocol messages");
                        }
                    }
                }
            }
        }

        animation.driver.shutdown();
        tracing::debug!("Animation loop finished");

        Ok(())
    }

    /// A timer that ticks once per spawn interval, the first tick being immediate.
    fn spawn_timer(spawn_interval_ms: u64) -> tokio::time::Interval {
        let mut timer =
            tokio::time::interval(std::time::Duration::from_millis(spawn_interval_ms.max(1)));
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        timer
    }

    /// Sleep until the next frame render is due.
    async fn sleep_until_next_frame_tick(&mut self) {
        let target = crate::renderer::ONE_MICROSECOND.wrapping_div(self.frame_rate.into());
        let target_frame_rate_micro = std::time::Duration::from_micros(target);
        if let Some(wait) = target_frame_rate_micro.checked_sub(self.last_frame_tick.elapsed()) {
            tokio::time::sleep(wait).await;
        }
        self.last_frame_tick = std::time::Instant::now();
    }

    /// Step, draw and send a frame to the renderer.
    ///
    /// The renderer stops listening as soon as it sees `End`, so a frame that was already due
    /// when shutting down has nowhere to go. That's not an error.
    async fn render(&mut self) -> Result<()> {
        let timestamp = self.started.elapsed();
        if !self.driver.frame(timestamp, &mut self.canvas) {
            return Ok(());
        }

        let surface = self.canvas.to_surface()?;
        if self.output.send(surface).await.is_err() {
            tracing::debug!("Renderer has gone, dropping frame");
            self.driver.shutdown();
        }

        Ok(())
    }

    /// Handle messages from the global protocol.
    #[expect(clippy::wildcard_enum_match_arm, reason = "It's our internal protocol")]
    fn handle_protocol_message(
        &mut self,
        message: Protocol,
        spawn_timer: &mut tokio::time::Interval,
    ) {
        match message {
            Protocol::Resize { width, height } => {
                let pixel_height = usize::from(height) * 2;
                self.canvas.resize(width.into(), pixel_height);
                self.driver
                    .resize(f32::from(width), f32::from(height) * 2.0);
            }
            Protocol::Config(config) => {
                tracing::debug!("Applying new config to the animation");
                self.frame_rate = config.frame_rate.max(1);
                *spawn_timer = Self::spawn_timer(config.spawn_interval_ms);
                self.driver.reconfigure(config.physics, config.render);
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn animation(width: u16, height: u16) -> (Animation, tokio::sync::mpsc::Receiver<Surface>) {
        let (output, surfaces) = tokio::sync::mpsc::channel(4);
        let config = crate::config::main::Config::default();
        let tty_size = crate::shared_state::TTYSize { width, height };
        (Animation::new(&config, tty_size, output), surfaces)
    }

    #[tokio::test]
    async fn frames_cover_the_whole_terminal() {
        let (mut animation, mut surfaces) = animation(20, 10);
        animation.driver.outlines_mut().finish_loading(Err(
            letterfall_physics::OutlineError::NoFont,
        ));
        animation.driver.spawn();
        animation.render().await.unwrap();

        let surface = surfaces.recv().await.unwrap();
        assert_eq!(surface.surface.dimensions(), (20, 10));
    }

    #[tokio::test]
    async fn frames_after_the_renderer_stops_are_dropped() {
        let (mut animation, surfaces) = animation(20, 10);
        drop(surfaces);

        animation.render().await.unwrap();
        assert!(!animation.driver.is_running());
        animation.render().await.unwrap();
    }

    #[tokio::test]
    async fn resizing_follows_the_terminal() {
        let (mut animation, _surfaces) = animation(20, 10);
        let mut timer = Animation::spawn_timer(1000);
        animation.handle_protocol_message(
            Protocol::Resize {
                width: 30,
                height: 5,
            },
            &mut timer,
        );

        assert_eq!(animation.canvas.pixel_width(), 30);
        assert_eq!(animation.canvas.pixel_height(), 10);
        assert!((animation.driver.simulation.bounds.height - 10.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn new_config_changes_the_frame_rate() {
        let (mut animation, _surfaces) = animation(20, 10);
        let mut timer = Animation::spawn_timer(1000);
        let mut config = crate::config::main::Config::default();
        config.frame_rate = 60;
        config.physics.population_cap = 3;
        animation.handle_protocol_message(Protocol::Config(Box::new(config)), &mut timer);

        assert_eq!(animation.frame_rate, 60);
        assert_eq!(animation.driver.simulation.config.population_cap, 3);
    }
}
