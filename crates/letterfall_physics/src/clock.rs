//! Turns frame timestamps into simulation deltas.

use std::time::Duration;

use crate::config::TimeStep;

/// Deltas longer than this many nominal frames are clamped, so that a long stall (like a
/// suspended laptop) doesn't teleport every letter through the floor.
const DEFAULT_MAX_FRAMES_PER_DELTA: f32 = 6.0;

/// Tracks the previous frame's timestamp.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// How deltas are measured.
    time_step: TimeStep,
    /// Timestamp of the previous frame, `None` before the first frame.
    last: Option<Duration>,
    /// The largest delta ever returned.
    max_delta: f32,
}

impl FrameClock {
    /// Instantiate
    #[must_use]
    pub fn new(time_step: TimeStep) -> Self {
        Self {
            time_step,
            last: None,
            max_delta: time_step.nominal_frame() * DEFAULT_MAX_FRAMES_PER_DELTA,
        }
    }

    /// Override the clamp on long deltas.
    #[must_use]
    pub const fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Change how deltas are measured, for example after a config reload.
    pub fn set_time_step(&mut self, time_step: TimeStep) {
        if self.time_step != time_step {
            *self = Self::new(time_step);
        }
    }

    /// Forget the previous timestamp, the next tick behaves like the first frame.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// The delta between this frame and the previous one, in the time step's units.
    ///
    /// Frame-based time always advances exactly one frame. Seconds-based time has no delta on
    /// the first frame, and none for a timestamp that goes backwards.
    pub fn tick(&mut self, now: Duration) -> f32 {
        let previous = self.last.replace(now);

        match self.time_step {
            TimeStep::PerFrame => 1.0,
            TimeStep::Seconds => {
                let Some(previous) = previous else {
                    return 0.0;
                };
                let Some(elapsed) = now.checked_sub(previous) else {
                    tracing::trace!("Frame timestamp went backwards, using a zero delta");
                    return 0.0;
                };
                elapsed.as_secs_f32().min(self.max_delta)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_delta() {
        let mut clock = FrameClock::new(TimeStep::Seconds);
        assert!(clock.tick(Duration::from_millis(500)).abs() < f32::EPSILON);
        let delta = clock.tick(Duration::from_millis(516));
        assert!((delta - 0.016).abs() < 1e-6);
    }

    #[test]
    fn frame_based_time_is_always_one() {
        let mut clock = FrameClock::new(TimeStep::PerFrame);
        assert!((clock.tick(Duration::from_secs(3)) - 1.0).abs() < f32::EPSILON);
        assert!((clock.tick(Duration::from_secs(9)) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn backwards_time_gives_zero() {
        let mut clock = FrameClock::new(TimeStep::Seconds);
        clock.tick(Duration::from_secs(2));
        assert!(clock.tick(Duration::from_secs(1)).abs() < f32::EPSILON);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = FrameClock::new(TimeStep::Seconds).with_max_delta(0.05);
        clock.tick(Duration::ZERO);
        assert!((clock.tick(Duration::from_secs(10)) - 0.05).abs() < f32::EPSILON);
    }
}
