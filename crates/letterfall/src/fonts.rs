//! Finding a font to take letter shapes from.

use letterfall_physics::{FontOutlines, OutlineError};

/// Bold sans-serif fonts that are commonly installed. Bold glyphs survive being rasterised at
/// terminal sizes much better than regular ones.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// The font to load: the configured one if there is one, otherwise the first system font that
/// exists.
#[must_use]
pub fn find(configured: Option<&std::path::Path>) -> Option<std::path::PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }

    let found = SYSTEM_FONT_CANDIDATES
        .iter()
        .map(std::path::PathBuf::from)
        .find(|path| path.exists());
    match &found {
        Some(path) => tracing::debug!("Found system font: {}", path.display()),
        None => tracing::debug!("No system font found"),
    }
    found
}

/// Load the font, or explain why there isn't one.
///
/// # Errors
/// When no font was found, or it couldn't be read or parsed.
pub async fn load(
    configured: Option<std::path::PathBuf>,
    sample_length: f32,
) -> Result<FontOutlines, OutlineError> {
    let Some(path) = find(configured.as_deref()) else {
        return Err(OutlineError::NoFont);
    };
    FontOutlines::load(path, sample_length).await
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn configured_font_wins() {
        let path = std::path::Path::new("/some/where/font.ttf");
        assert_eq!(find(Some(path)), Some(path.to_path_buf()));
    }

    #[tokio::test]
    async fn missing_configured_font_is_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let result = load(Some(directory.path().join("nope.ttf")), 1.0).await;
        assert!(matches!(result, Err(OutlineError::FontRead { .. })));
    }
}
