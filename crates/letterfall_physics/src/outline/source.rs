//! The outline provider an app actually uses: a font that loads asynchronously, with the
//! table-driven shapes to degrade to when there isn't one.

use crate::errors::OutlineError;
use crate::geometry::GlyphOutline;

use super::font::FontOutlines;
use super::provider::GlyphOutlineProvider;
use super::table::TableOutlines;

/// Where the font load has got to.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub enum FontState {
    /// The load hasn't finished. Outline requests are rejected until it does.
    #[default]
    Loading,
    /// The font is parsed and ready.
    Ready(FontOutlines),
    /// There's no font, either none was configured or loading it failed.
    Unavailable,
}

/// Font-derived outlines when a font is loaded, table-driven outlines when there isn't one.
#[derive(Debug, Clone, Default)]
pub struct OutlineSource {
    /// The font's loading state.
    font: FontState,
}

impl OutlineSource {
    /// A source that waits for a font load to finish before producing any outlines.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            font: FontState::Loading,
        }
    }

    /// A source that only ever uses the table-driven outlines.
    #[must_use]
    pub const fn table_only() -> Self {
        Self {
            font: FontState::Unavailable,
        }
    }

    /// A source with an already loaded font.
    #[must_use]
    pub fn with_font(font: FontOutlines) -> Self {
        Self {
            font: FontState::Ready(font),
        }
    }

    /// Accept the result of the asynchronous font load. A failure isn't fatal, it just means
    /// the table-driven outlines are used from now on.
    pub fn finish_loading(&mut self, result: Result<FontOutlines, OutlineError>) {
        self.font = match result {
            Ok(font) => {
                tracing::debug!("Font ready, using font-derived outlines");
                FontState::Ready(font)
            }
            Err(error) => {
                tracing::warn!("Font unavailable, using table-driven outlines: {error}");
                FontState::Unavailable
            }
        };
    }

    /// The current state of the font.
    #[must_use]
    pub const fn font_state(&self) -> &FontState {
        &self.font
    }

    /// Whether the font load has finished, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self.font, FontState::Loading)
    }
}

impl GlyphOutlineProvider for OutlineSource {
    fn outline(&self, character: char, size: f32) -> Result<GlyphOutline, OutlineError> {
        match &self.font {
            FontState::Loading => Err(OutlineError::FontNotLoaded),
            FontState::Ready(font) => font.outline(character, size),
            FontState::Unavailable => TableOutlines.outline(character, size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_until_loaded() {
        let source = OutlineSource::loading();
        assert!(!source.is_settled());
        assert!(matches!(
            source.outline('A', 30.0),
            Err(OutlineError::FontNotLoaded)
        ));
    }

    #[test]
    fn failed_load_degrades_to_table() {
        let mut source = OutlineSource::loading();
        source.finish_loading(Err(OutlineError::FontNotLoaded));
        assert!(source.is_settled());
        assert!(matches!(source.font_state(), FontState::Unavailable));
        let outline = source.outline('Z', 30.0).unwrap();
        assert_eq!(outline.vertex_count(), 4);
    }
}
