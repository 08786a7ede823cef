//! A software rasteriser that letters are drawn onto before they reach the terminal or a PNG.

use std::sync::Arc;

use color_eyre::eyre::Result;
use glam::{Affine2, Vec2};
use letterfall_physics::geometry::Contour;
use letterfall_physics::{Canvas, Colour, GlyphOutlineProvider, TextStyle};

/// Text marks fainter than this are forgotten.
const MIN_TEXT_MARK_ALPHA: f32 = 0.05;

/// Channels closer than this to the background are left as the terminal's own background.
const BACKGROUND_TOLERANCE: f32 = 1.0 / 255.0;

/// A character drawn with `fill_text` that couldn't be rasterised. The terminal shows it as a
/// real character in the cell under its position.
#[derive(Debug, Clone, PartialEq)]
struct TextMark {
    /// Where the character's centre landed, in pixels.
    position: Vec2,
    /// The character
    character: char,
    /// Its colour. The alpha fades in trail mode.
    colour: Colour,
}

/// An RGBA pixel buffer with a 2D transform stack.
#[derive(Clone)]
pub struct PixelCanvas {
    /// Width in pixels
    width: usize,
    /// Height in pixels
    height: usize,
    /// Row-major pixels
    pixels: Vec<Colour>,
    /// The current transform
    transform: Affine2,
    /// Transforms pushed by `save`
    saved: Vec<Affine2>,
    /// The colour of the most recent `clear`
    background: Colour,
    /// Characters waiting to be drawn by the terminal
    text_marks: Vec<TextMark>,
    /// Turns `fill_text` characters into polygons. Without it text becomes text marks.
    text_outlines: Option<Arc<dyn GlyphOutlineProvider + Send + Sync>>,
}

impl std::fmt::Debug for PixelCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("text_marks", &self.text_marks.len())
            .finish_non_exhaustive()
    }
}

#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Pixel coordinates are clamped to the canvas before any conversion"
)]
impl PixelCanvas {
    /// Instantiate a canvas of the given size in pixels.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let background = letterfall_physics::canvas::BLACK;
        Self {
            width,
            height,
            pixels: vec![background; width * height],
            transform: Affine2::IDENTITY,
            saved: Vec::new(),
            background,
            text_marks: Vec::new(),
            text_outlines: None,
        }
    }

    /// A canvas that covers a terminal, one pixel per column and 2 per row.
    #[must_use]
    pub fn for_terminal(columns: u16, rows: u16) -> Self {
        Self::new(columns.into(), usize::from(rows) * 2)
    }

    /// Rasterise `fill_text` with these outlines instead of leaving text marks.
    #[must_use]
    pub fn with_text_outlines(
        mut self,
        outlines: Arc<dyn GlyphOutlineProvider + Send + Sync>,
    ) -> Self {
        self.text_outlines = Some(outlines);
        self
    }

    /// Change size, discarding everything drawn so far.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![self.background; width * height];
        self.text_marks.clear();
    }

    /// The colour of a single pixel.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Colour> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Width in pixels
    #[must_use]
    pub const fn pixel_width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn pixel_height(&self) -> usize {
        self.height
    }

    /// Whether a pixel is indistinguishable from the background.
    fn is_background(&self, colour: Colour) -> bool {
        (colour.0 - self.background.0).abs() < BACKGROUND_TOLERANCE
            && (colour.1 - self.background.1).abs() < BACKGROUND_TOLERANCE
            && (colour.2 - self.background.2).abs() < BACKGROUND_TOLERANCE
    }

    /// Convert to a terminal surface. Background pixels are left as the terminal's default
    /// background so that transparent terminals stay transparent.
    ///
    /// # Errors
    /// If the surface and canvas sizes disagree.
    pub fn to_surface(&self) -> Result<crate::surface::Surface> {
        let rows = self.height.div_ceil(2);
        let mut surface = crate::surface::Surface::new(self.width, rows);

        for (index, colour) in self.pixels.iter().enumerate() {
            if self.is_background(*colour) {
                continue;
            }
            let x = index.rem_euclid(self.width);
            let y = index.div_euclid(self.width);
            surface.add_pixel(x, y, *colour)?;
        }

        for mark in &self.text_marks {
            if mark.position.x < 0.0 || mark.position.y < 0.0 {
                continue;
            }
            let column = mark.position.x as usize;
            let row = (mark.position.y / 2.0) as usize;
            if column >= self.width || row >= rows {
                continue;
            }
            let colour = blend(self.background, mark.colour);
            surface.add_text(column, row, mark.character.to_string(), None, colour);
        }

        Ok(surface)
    }

    /// Convert to an image.
    #[must_use]
    pub fn to_image(&self) -> image::RgbaImage {
        let width = u32::try_from(self.width).unwrap_or(u32::MAX);
        let height = u32::try_from(self.height).unwrap_or(u32::MAX);
        image::RgbaImage::from_fn(width, height, |x, y| {
            let colour = self
                .pixel(x as usize, y as usize)
                .unwrap_or(self.background);
            image::Rgba([
                to_byte(colour.0),
                to_byte(colour.1),
                to_byte(colour.2),
                to_byte(colour.3),
            ])
        })
    }

    /// Save as a PNG.
    ///
    /// # Errors
    /// If the file can't be written.
    pub fn save_png(&self, path: &std::path::Path) -> Result<()> {
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        tracing::debug!("Saved canvas snapshot to {}", path.display());
        Ok(())
    }

    /// Fill polygons, already in pixel space, with the even-odd rule. Pixels are sampled at
    /// their centres.
    fn fill_polygons(&mut self, polygons: &[Vec<Vec2>], colour: Colour) {
        let Some((min_y, max_y)) = polygons
            .iter()
            .flatten()
            .map(|point| point.y)
            .fold(None, |range: Option<(f32, f32)>, y| match range {
                None => Some((y, y)),
                Some((min, max)) => Some((min.min(y), max.max(y))),
            })
        else {
            return;
        };
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }

        let first_row = min_y.floor().max(0.0) as usize;
        let last_row = (max_y.ceil().max(0.0) as usize).min(self.height);
        let mut crossings: Vec<f32> = Vec::new();

        for row in first_row..last_row {
            let y = row as f32 + 0.5;
            crossings.clear();
            for polygon in polygons {
                for (index, start) in polygon.iter().enumerate() {
                    let Some(end) = polygon.get((index + 1) % polygon.len()) else {
                        continue;
                    };
                    if (start.y <= y) != (end.y <= y) {
                        let fraction = (y - start.y) / (end.y - start.y);
                        crossings.push(start.x + fraction * (end.x - start.x));
                    }
                }
            }
            crossings.sort_by(f32::total_cmp);

            for span in crossings.chunks_exact(2) {
                let (Some(left), Some(right)) = (span.first(), span.get(1)) else {
                    continue;
                };
                let first_column = (left - 0.5).ceil().max(0.0) as usize;
                let end_column = ((right - 0.5).ceil().max(0.0) as usize).min(self.width);
                for column in first_column..end_column {
                    self.blend_pixel(column, row, colour);
                }
            }
        }
    }

    /// Blend a colour over a single pixel.
    fn blend_pixel(&mut self, x: usize, y: usize, colour: Colour) {
        let index = y * self.width + x;
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = blend(*pixel, colour);
        }
    }

    /// Fade or forget text marks under a translucent rectangle.
    fn fade_text_marks(&mut self, min: Vec2, max: Vec2, alpha: f32) {
        for mark in &mut self.text_marks {
            let position = mark.position;
            if position.cmpge(min).all() && position.cmple(max).all() {
                mark.colour.3 *= 1.0 - alpha;
            }
        }
        self.text_marks
            .retain(|mark| mark.colour.3 >= MIN_TEXT_MARK_ALPHA);
    }
}

/// Source-over alpha blending. The result is always opaque.
fn blend(destination: Colour, source: Colour) -> Colour {
    let alpha = source.3.clamp(0.0, 1.0);
    let mix = |under: f32, over: f32| over * alpha + under * (1.0 - alpha);
    (
        mix(destination.0, source.0),
        mix(destination.1, source.1),
        mix(destination.2, source.2),
        1.0,
    )
}

/// A colour channel as a byte.
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The channel is clamped to 0-255 first"
)]
fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Canvas sizes are far below where f32 loses integer precision"
)]
impl Canvas for PixelCanvas {
    fn width(&self) -> f32 {
        self.width as f32
    }

    fn height(&self) -> f32 {
        self.height as f32
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    fn scale(&mut self, factor: f32) {
        self.transform = self.transform * Affine2::from_scale(Vec2::splat(factor));
    }

    fn clear(&mut self, colour: Colour) {
        self.background = colour;
        self.pixels.fill(colour);
        self.text_marks.clear();
    }

    fn fill_rect(&mut self, position: Vec2, size: Vec2, colour: Colour) {
        let corners = vec![
            self.transform.transform_point2(position),
            self.transform
                .transform_point2(position + Vec2::new(size.x, 0.0)),
            self.transform.transform_point2(position + size),
            self.transform
                .transform_point2(position + Vec2::new(0.0, size.y)),
        ];
        let min = corners.iter().copied().fold(Vec2::INFINITY, Vec2::min);
        let max = corners.iter().copied().fold(Vec2::NEG_INFINITY, Vec2::max);

        self.fill_polygons(&[corners], colour);
        self.fade_text_marks(min, max, colour.3.clamp(0.0, 1.0));
    }

    fn fill_path(&mut self, contours: &[Contour], colour: Colour) {
        let transformed: Vec<Vec<Vec2>> = contours
            .iter()
            .map(|contour| {
                contour
                    .iter()
                    .map(|point| self.transform.transform_point2(*point))
                    .collect()
            })
            .collect();
        self.fill_polygons(&transformed, colour);
    }

    fn fill_text(&mut self, character: char, style: &TextStyle, colour: Colour) {
        if let Some(outlines) = &self.text_outlines {
            match outlines.outline(character, style.size) {
                Ok(outline) => {
                    let contours = outline.contours().to_vec();
                    self.fill_path(&contours, colour);
                    return;
                }
                Err(error) => {
                    tracing::trace!("Couldn't rasterise '{character}' as text: {error}");
                }
            }
        }

        self.text_marks.push(TextMark {
            position: self.transform.transform_point2(Vec2::ZERO),
            character,
            colour,
        });
    }
}
