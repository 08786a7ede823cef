//! Drawing the simulation onto a canvas.

use crate::canvas::{Canvas, Colour, TextStyle, BLACK};
use crate::simulation::Simulation;

/// How each letter is drawn.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RenderStrategy {
    /// Fill the letter's cached outline polygons.
    #[default]
    Outline,
    /// Draw the character with the canvas's text primitive.
    Text,
}

/// What happens to the previous frame before drawing the next one.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Background {
    /// Wipe the previous frame completely.
    #[default]
    Hard,
    /// Paint a translucent layer over the previous frame, leaving fading trails.
    Trail,
}

/// Everything that affects how a frame looks.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct RenderOptions {
    /// How letters are drawn.
    pub strategy: RenderStrategy,
    /// How the previous frame is removed.
    pub background: Background,
    /// The opacity of the layer painted over the previous frame in trail mode.
    pub trail_alpha: f32,
    /// The colour of the background.
    pub background_colour: Colour,
    /// Font family for the text strategy.
    pub font_family: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strategy: RenderStrategy::default(),
            background: Background::default(),
            trail_alpha: 0.25,
            background_colour: BLACK,
            font_family: "sans-serif".to_owned(),
        }
    }
}

impl RenderOptions {
    /// Instantiate with a particular strategy and background.
    #[must_use]
    pub fn new(strategy: RenderStrategy, background: Background) -> Self {
        Self {
            strategy,
            background,
            ..Self::default()
        }
    }
}

/// Draw one frame.
///
/// Each letter is drawn in its own coordinate space: translated to its position, rotated by its
/// angle and scaled by how much it has grown since its outline was made.
pub fn render<C: Canvas + ?Sized>(simulation: &Simulation, canvas: &mut C, options: &RenderOptions) {
    paint_background(canvas, options);

    for particle in &simulation.particles {
        canvas.save();
        canvas.translate(particle.position);
        canvas.rotate(particle.angle);

        match options.strategy {
            RenderStrategy::Outline => {
                canvas.scale(particle.render_scale());
                canvas.fill_path(particle.outline.contours(), particle.colour);
            }
            RenderStrategy::Text => {
                let style = TextStyle::new(particle.size, &options.font_family);
                canvas.fill_text(particle.character, &style, particle.colour);
            }
        }

        canvas.restore();
    }
}

/// Clear, or fade, whatever was drawn last frame.
fn paint_background<C: Canvas + ?Sized>(canvas: &mut C, options: &RenderOptions) {
    match options.background {
        Background::Hard => canvas.clear(options.background_colour),
        Background::Trail => {
            let (red, green, blue, _) = options.background_colour;
            let size = glam::Vec2::new(canvas.width(), canvas.height());
            canvas.fill_rect(
                glam::Vec2::ZERO,
                size,
                (red, green, blue, options.trail_alpha.clamp(0.0, 1.0)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::geometry::Contour;
    use crate::outline::table::TableOutlines;

    /// Records every call so the order can be checked.
    #[derive(Default)]
    struct RecordingCanvas {
        calls: Vec<String>,
    }

    impl Canvas for RecordingCanvas {
        fn width(&self) -> f32 {
            400.0
        }
        fn height(&self) -> f32 {
            600.0
        }
        fn save(&mut self) {
            self.calls.push("save".into());
        }
        fn restore(&mut self) {
            self.calls.push("restore".into());
        }
        fn translate(&mut self, offset: Vec2) {
            self.calls.push(format!("translate {} {}", offset.x, offset.y));
        }
        fn rotate(&mut self, angle: f32) {
            self.calls.push(format!("rotate {angle}"));
        }
        fn scale(&mut self, factor: f32) {
            self.calls.push(format!("scale {factor}"));
        }
        fn clear(&mut self, _colour: Colour) {
            self.calls.push("clear".into());
        }
        fn fill_rect(&mut self, _position: Vec2, size: Vec2, colour: Colour) {
            self.calls
                .push(format!("fill_rect {} {} {}", size.x, size.y, colour.3));
        }
        fn fill_path(&mut self, contours: &[Contour], _colour: Colour) {
            self.calls.push(format!("fill_path {}", contours.len()));
        }
        fn fill_text(&mut self, character: char, _style: &TextStyle, _colour: Colour) {
            self.calls.push(format!("fill_text {character}"));
        }
    }

    fn simulation_with_o() -> Simulation {
        let mut simulation = Simulation::new(SimulationConfig::metric(), 400.0, 600.0);
        simulation
            .spawn_at('O', &TableOutlines, Vec2::new(100.0, 200.0), Vec2::ZERO)
            .unwrap();
        simulation
    }

    #[test]
    fn outlines_are_drawn_inside_save_and_restore() {
        let simulation = simulation_with_o();
        let mut canvas = RecordingCanvas::default();
        render(&simulation, &mut canvas, &RenderOptions::default());

        assert_eq!(
            canvas.calls,
            vec![
                "clear",
                "save",
                "translate 100 200",
                "rotate 0",
                "scale 1",
                "fill_path 1",
                "restore",
            ]
        );
    }

    #[test]
    fn trails_paint_a_translucent_layer() {
        let simulation = simulation_with_o();
        let mut canvas = RecordingCanvas::default();
        let options = RenderOptions::new(RenderStrategy::Text, Background::Trail);
        render(&simulation, &mut canvas, &options);

        assert_eq!(canvas.calls[0], "fill_rect 400 600 0.25");
        assert!(canvas.calls.contains(&"fill_text O".to_owned()));
        assert!(!canvas.calls.contains(&"clear".to_owned()));
    }
}
