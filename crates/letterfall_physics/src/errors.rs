//! Errors for this library
//!
//! None of these are fatal to a running animation. A spawn that hits one of them is simply
//! skipped, and the next spawn tick tries again.

/// Reasons why a glyph outline couldn't be produced.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum OutlineError {
    #[snafu(display("The font hasn't finished loading yet"))]
    /// Outlines were requested before the asynchronous font load completed.
    FontNotLoaded,

    #[snafu(display("No font was configured and none of the usual system fonts exist"))]
    /// There's no font to load.
    NoFont,

    #[snafu(display("The font has no glyph for '{character}'"))]
    /// The font doesn't contain the character, or the glyph has no outline (like a space).
    MissingGlyph {
        /// The requested character
        character: char,
    },

    #[snafu(display("The outline for '{character}' only has {points} usable points"))]
    /// Sampling the glyph's path produced fewer than 3 points.
    Degenerate {
        /// The requested character
        character: char,
        /// How many points survived sampling
        points: usize,
    },

    #[snafu(display("Couldn't read font file: {}", path.display()))]
    /// The font file couldn't be read from disk.
    FontRead {
        /// Location of the font file
        path: std::path::PathBuf,
        /// The parent error type
        source: std::io::Error,
    },

    #[snafu(display("Couldn't parse font data"))]
    /// The bytes aren't a valid TrueType/OpenType font.
    InvalidFont {
        /// The parent error type
        source: ttf_parser::FaceParsingError,
    },
}

/// Reasons why an outline couldn't be turned into a body.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum BodyError {
    #[snafu(display("The outline for '{character}' has no usable area ({area})"))]
    /// The outline's polygons enclose no area, or the area isn't a finite number.
    NoArea {
        /// The requested character
        character: char,
        /// The computed area
        area: f32,
    },

    #[snafu(display("Size {size} for '{character}' isn't positive and finite"))]
    /// A body can't be created with a zero, negative or non-finite size.
    InvalidSize {
        /// The requested character
        character: char,
        /// The requested size
        size: f32,
    },
}

/// Everything that can stop a body from being spawned.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum SpawnError {
    #[snafu(display("No outline available"))]
    /// The outline provider couldn't make a shape.
    Outline {
        /// The parent error type
        source: OutlineError,
    },

    #[snafu(display("Couldn't construct body"))]
    /// The outline couldn't be made into a body.
    Body {
        /// The parent error type
        source: BodyError,
    },

    #[snafu(display("The world has no area to spawn into"))]
    /// The world bounds are zero-sized, usually because the surface hasn't been sized yet.
    EmptyWorld,

    #[snafu(display("The population cap is 0, so no letter can be live"))]
    /// A new letter would be evicted the moment it was added.
    NoRoom,
}
