//! The contract shared by every outline strategy.

use crate::errors::OutlineError;
use crate::geometry::GlyphOutline;

/// Turns a character at a given size into a closed polygon set centred on the origin.
///
/// Implementations must never return a degenerate outline: fewer than 3 points is an
/// [`OutlineError::Degenerate`], not an empty shape.
pub trait GlyphOutlineProvider {
    /// Produce the outline of `character` for a glyph `size` pixels tall.
    ///
    /// # Errors
    /// When no shape can be produced for the character at this moment.
    fn outline(&self, character: char, size: f32) -> Result<GlyphOutline, OutlineError>;
}
