//! Real glyph silhouettes sampled from TrueType/OpenType font data.

use std::sync::Arc;

use glam::Vec2;
use snafu::{OptionExt as _, ResultExt as _};

use crate::errors::{
    DegenerateSnafu, FontReadSnafu, InvalidFontSnafu, MissingGlyphSnafu, OutlineError,
};
use crate::geometry::{Contour, GlyphOutline};

/// Distance, in pixels, between sampled points along a glyph's path.
pub const DEFAULT_SAMPLE_LENGTH: f32 = 5.0;

/// Sampling any finer than this just produces huge vertex lists for no visible gain.
const MIN_SAMPLE_LENGTH: f32 = 0.1;

/// The maximum number of points a single curve segment is divided into.
const MAX_SEGMENT_STEPS: usize = 64;

/// Parsed font data and the sampling tolerance to flatten its outlines with.
///
/// Only the raw bytes are kept. A `ttf_parser::Face` is created on demand for each query,
/// parsing is just header validation and offset table construction.
#[derive(Clone)]
pub struct FontOutlines {
    /// The entire font file.
    bytes: Arc<[u8]>,
    /// Font units per em, the design coordinate space.
    units_per_em: u16,
    /// Distance between sampled points.
    sample_length: f32,
}

impl FontOutlines {
    /// Parse font data from an owned byte buffer.
    ///
    /// # Errors
    /// If the data isn't a valid TrueType/OpenType font.
    pub fn from_bytes(bytes: Arc<[u8]>, sample_length: f32) -> Result<Self, OutlineError> {
        let face = ttf_parser::Face::parse(&bytes, 0).context(InvalidFontSnafu)?;
        let units_per_em = face.units_per_em();
        Ok(Self {
            bytes,
            units_per_em,
            sample_length: sample_length.max(MIN_SAMPLE_LENGTH),
        })
    }

    /// Asynchronously read and parse a font file.
    ///
    /// # Errors
    /// If the file can't be read or isn't a valid font.
    pub async fn load(
        path: std::path::PathBuf,
        sample_length: f32,
    ) -> Result<Self, OutlineError> {
        tracing::debug!("Loading font from {}", path.display());
        let bytes = tokio::fs::read(&path)
            .await
            .context(FontReadSnafu { path: path.clone() })?;
        let font = Self::from_bytes(Arc::from(bytes), sample_length)?;
        tracing::info!(
            "Loaded font {} ({} units per em)",
            path.display(),
            font.units_per_em
        );
        Ok(font)
    }

    /// Whether the font has a glyph for the character.
    #[must_use]
    pub fn has_glyph(&self, character: char) -> bool {
        self.face()
            .is_ok_and(|face| face.glyph_index(character).is_some())
    }

    /// Font units per em.
    #[must_use]
    pub const fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// The bytes were validated in `from_bytes()`, so this only fails if they were somehow
    /// corrupted afterwards.
    fn face(&self) -> Result<ttf_parser::Face<'_>, OutlineError> {
        ttf_parser::Face::parse(&self.bytes, 0).context(InvalidFontSnafu)
    }
}

impl std::fmt::Debug for FontOutlines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontOutlines")
            .field("units_per_em", &self.units_per_em)
            .field("sample_length", &self.sample_length)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl super::provider::GlyphOutlineProvider for FontOutlines {
    fn outline(&self, character: char, size: f32) -> Result<GlyphOutline, OutlineError> {
        let face = self.face()?;
        let glyph = face
            .glyph_index(character)
            .context(MissingGlyphSnafu { character })?;

        let scale = size / f32::from(self.units_per_em);
        let mut sampler = PathSampler::new(scale, self.sample_length);
        face.outline_glyph(glyph, &mut sampler)
            .context(MissingGlyphSnafu { character })?;

        outline_from_contours(character, sampler.finish())
    }
}

/// Turn sampled contours into a centred outline, or report how few points there were.
fn outline_from_contours(
    character: char,
    contours: Vec<Contour>,
) -> Result<GlyphOutline, OutlineError> {
    let points = contours.iter().map(Vec::len).sum::<usize>();
    GlyphOutline::from_contours(contours).context(DegenerateSnafu { character, points })
}

/// Flattens a glyph's path into evenly spaced points.
///
/// Font coordinates are y-up, so y is flipped here to match a canvas's y-down space.
#[derive(Debug)]
pub(crate) struct PathSampler {
    /// Font units to pixels.
    scale: f32,
    /// Distance between sampled points.
    sample_length: f32,
    /// The pen position, already in pixel space.
    cursor: Vec2,
    /// The contour currently being drawn.
    current: Contour,
    /// All finished contours.
    contours: Vec<Contour>,
}

impl PathSampler {
    /// Instantiate
    pub(crate) fn new(scale: f32, sample_length: f32) -> Self {
        Self {
            scale,
            sample_length: sample_length.max(MIN_SAMPLE_LENGTH),
            cursor: Vec2::ZERO,
            current: Vec::new(),
            contours: Vec::new(),
        }
    }

    /// Complete any open contour and return everything sampled.
    pub(crate) fn finish(mut self) -> Vec<Contour> {
        self.end_contour();
        self.contours
    }

    /// Convert from font space to canvas space.
    fn to_canvas(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x * self.scale, -y * self.scale)
    }

    /// How many points a segment of the given length should be divided into.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions,
        reason = "The value is clamped to a small positive range first"
    )]
    fn steps_for(&self, length: f32) -> usize {
        let steps = (length / self.sample_length).ceil();
        if !steps.is_finite() || steps < 1.0 {
            return 1;
        }
        (steps as usize).clamp(1, MAX_SEGMENT_STEPS)
    }

    /// Sample points along a parametric segment, excluding its start (already in the contour).
    #[expect(
        clippy::cast_precision_loss,
        clippy::as_conversions,
        reason = "Step counts are tiny"
    )]
    fn sample(&mut self, approximate_length: f32, point_at: impl Fn(f32) -> Vec2) {
        let steps = self.steps_for(approximate_length);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            self.current.push(point_at(t));
        }
    }

    /// Start a contour at the cursor if a segment arrives without a preceding `move_to`.
    fn ensure_started(&mut self) {
        if self.current.is_empty() {
            self.current.push(self.cursor);
        }
    }

    /// Save the current contour.
    fn end_contour(&mut self) {
        if !self.current.is_empty() {
            self.contours.push(std::mem::take(&mut self.current));
        }
    }
}

impl ttf_parser::OutlineBuilder for PathSampler {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_contour();
        self.cursor = self.to_canvas(x, y);
        self.current.push(self.cursor);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ensure_started();
        let start = self.cursor;
        let end = self.to_canvas(x, y);
        self.sample(start.distance(end), |t| start.lerp(end, t));
        self.cursor = end;
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.ensure_started();
        let start = self.cursor;
        let control = self.to_canvas(x1, y1);
        let end = self.to_canvas(x, y);
        // The control polygon is always at least as long as the curve.
        let length = start.distance(control) + control.distance(end);
        self.sample(length, |t| {
            let s = 1.0 - t;
            start * (s * s) + control * (2.0 * s * t) + end * (t * t)
        });
        self.cursor = end;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.ensure_started();
        let start = self.cursor;
        let control1 = self.to_canvas(x1, y1);
        let control2 = self.to_canvas(x2, y2);
        let end = self.to_canvas(x, y);
        let length =
            start.distance(control1) + control1.distance(control2) + control2.distance(end);
        self.sample(length, |t| {
            let s = 1.0 - t;
            start * (s * s * s)
                + control1 * (3.0 * s * s * t)
                + control2 * (3.0 * s * t * t)
                + end * (t * t * t)
        });
        self.cursor = end;
    }

    fn close(&mut self) {
        self.end_contour();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::provider::GlyphOutlineProvider as _;
    use ttf_parser::OutlineBuilder as _;

    #[test]
    fn lines_are_densely_sampled() {
        let mut sampler = PathSampler::new(1.0, 5.0);
        sampler.move_to(0.0, 0.0);
        sampler.line_to(100.0, 0.0);
        sampler.line_to(100.0, 100.0);
        sampler.line_to(0.0, 100.0);
        sampler.line_to(0.0, 0.0);
        sampler.close();
        let contours = sampler.finish();

        assert_eq!(contours.len(), 1);
        // 1 starting point plus 20 points per side.
        assert_eq!(contours[0].len(), 81);

        let outline = GlyphOutline::from_contours(contours).unwrap();
        assert_eq!(outline.vertex_count(), 80);
        assert!(outline.centroid().length() < 1e-3);
    }

    #[test]
    fn y_is_flipped_into_canvas_space() {
        let mut sampler = PathSampler::new(0.5, 100.0);
        sampler.move_to(0.0, 10.0);
        sampler.line_to(10.0, 10.0);
        sampler.close();
        let contours = sampler.finish();
        assert_eq!(contours[0][0], Vec2::new(0.0, -5.0));
        assert_eq!(contours[0][1], Vec2::new(5.0, -5.0));
    }

    #[test]
    fn curves_end_exactly_on_their_end_point() {
        let mut sampler = PathSampler::new(1.0, 1.0);
        sampler.move_to(0.0, 0.0);
        sampler.quad_to(10.0, 20.0, 20.0, 0.0);
        sampler.curve_to(20.0, -10.0, 0.0, -10.0, 0.0, 0.0);
        sampler.close();
        let contours = sampler.finish();
        let contour = &contours[0];
        assert!(contour.len() > 20);
        assert!(contour.iter().any(|point| (point.x - 20.0).abs() < 1e-4 && point.y.abs() < 1e-4));
        let last = contour.last().unwrap();
        assert!(last.length() < 1e-4);
    }

    #[test]
    fn multiple_contours_are_kept_separate() {
        let mut sampler = PathSampler::new(1.0, 50.0);
        for offset in [0.0, 200.0] {
            sampler.move_to(offset, 0.0);
            sampler.line_to(offset + 10.0, 0.0);
            sampler.line_to(offset + 10.0, 10.0);
            sampler.close();
        }
        assert_eq!(sampler.finish().len(), 2);
    }

    #[test]
    fn too_few_points_is_degenerate() {
        let contours = vec![vec![Vec2::ZERO, Vec2::new(5.0, 0.0)]];
        let result = outline_from_contours('i', contours);
        assert!(matches!(
            result,
            Err(OutlineError::Degenerate {
                character: 'i',
                points: 2
            })
        ));
    }

    #[test]
    fn sampled_glyph_paths_are_centred() {
        // An "L" drawn in font units, y-up, well away from the origin.
        let mut sampler = PathSampler::new(0.1, 2.0);
        sampler.move_to(100.0, 100.0);
        sampler.line_to(160.0, 100.0);
        sampler.line_to(160.0, 120.0);
        sampler.line_to(120.0, 120.0);
        sampler.line_to(120.0, 300.0);
        sampler.line_to(100.0, 300.0);
        sampler.close();

        let outline = outline_from_contours('L', sampler.finish()).unwrap();
        let points: Vec<Vec2> = outline.contours().iter().flatten().copied().collect();
        assert!(points.len() > 6);
        let mean = points.iter().copied().sum::<Vec2>() / points.len() as f32;
        assert!(mean.length() < 1e-3, "{mean}");

        let (min, max) = outline.bounding_box();
        assert!((max.x - min.x - 6.0).abs() < 1e-3);
        assert!((max.y - min.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn garbage_is_not_a_font() {
        let result = FontOutlines::from_bytes(Arc::from(vec![0_u8; 64]), DEFAULT_SAMPLE_LENGTH);
        assert!(matches!(result, Err(OutlineError::InvalidFont { .. })));
    }

    #[tokio::test]
    async fn missing_font_file() {
        let result = FontOutlines::load("/no/such/font.ttf".into(), DEFAULT_SAMPLE_LENGTH).await;
        assert!(matches!(result, Err(OutlineError::FontRead { .. })));
    }

    /// Only runs where a common system font happens to be installed.
    #[tokio::test]
    async fn system_font_outlines_are_centred() {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        ];
        let Some(path) = candidates
            .iter()
            .map(std::path::PathBuf::from)
            .find(|path| path.exists())
        else {
            return;
        };

        let font = FontOutlines::load(path, DEFAULT_SAMPLE_LENGTH).await.unwrap();
        for character in ['A', 'B', 'W', 'O'] {
            let outline = font.outline(character, 60.0).unwrap();
            assert!(outline.vertex_count() >= 3);
            assert!(outline.centroid().length() < 1e-2);
        }
        assert!(matches!(
            font.outline(' ', 60.0),
            Err(OutlineError::MissingGlyph { .. })
        ));
    }
}
