//! The drawing surface that frames are rendered onto.

use glam::Vec2;

use crate::geometry::Contour;

/// An RGBA colour, each channel from 0.0 to 1.0.
pub type Colour = (f32, f32, f32, f32);

/// A default pure white.
pub const WHITE: Colour = (1.0, 1.0, 1.0, 1.0);

/// A default pure black.
pub const BLACK: Colour = (0.0, 0.0, 0.0, 1.0);

/// How text should be drawn by [`Canvas::fill_text`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct TextStyle {
    /// Font size in pixels
    pub size: f32,
    /// Font family name, implementations are free to ignore it.
    pub family: String,
}

impl TextStyle {
    /// Instantiate
    #[must_use]
    pub fn new(size: f32, family: &str) -> Self {
        Self {
            size,
            family: family.to_owned(),
        }
    }
}

/// A 2D drawing context with a transform stack.
///
/// Coordinates are pixels with y pointing down. Every drawing call is affected by the current
/// transform, which is built up with `translate`, `rotate` and `scale` and saved and restored
/// with `save` and `restore`.
pub trait Canvas {
    /// Width in pixels
    fn width(&self) -> f32;
    /// Height in pixels
    fn height(&self) -> f32;

    /// Push the current transform.
    fn save(&mut self);
    /// Pop back to the most recently saved transform.
    fn restore(&mut self);
    /// Move the origin.
    fn translate(&mut self, offset: Vec2);
    /// Rotate clockwise (with y down) by `angle` radians around the origin.
    fn rotate(&mut self, angle: f32);
    /// Uniformly scale around the origin.
    fn scale(&mut self, factor: f32);

    /// Replace every pixel with the colour, ignoring the transform.
    fn clear(&mut self, colour: Colour);
    /// Blend a rectangle over the canvas.
    fn fill_rect(&mut self, position: Vec2, size: Vec2, colour: Colour);
    /// Fill closed polygons using the even-odd rule.
    fn fill_path(&mut self, contours: &[Contour], colour: Colour);
    /// Draw a character centred on the origin.
    fn fill_text(&mut self, character: char, style: &TextStyle, colour: Colour);
}
