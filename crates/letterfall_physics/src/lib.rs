//! # Letterfall Physics
//! Letters that fall from the top of a surface, bounce off its walls and floor, and settle.
//!
//! There are 2 cooperating halves. Glyph outline providers turn a character and a size into a
//! closed polygon set centred on its own origin, either from real font data ([`FontOutlines`])
//! or from a small table of hand-authored shapes ([`TableOutlines`]). The [`Simulation`] owns
//! the live bodies and steps them with semi-implicit Euler integration.
//!
//! The [`FrameDriver`] glues them together for a host: one call per displayed frame does a
//! `step` followed by a `render` onto anything that implements [`Canvas`].

#![expect(clippy::pub_use, reason = "How else are you supposed re-export??")]

pub mod bounds;
pub mod canvas;
pub mod clock;
pub mod collision;
pub mod config;
pub mod errors;
pub mod frame;
pub mod geometry;
/// Everything to do with turning characters into polygons.
pub mod outline {
    pub mod font;
    pub mod provider;
    pub mod source;
    pub mod table;
}
pub mod particle;
pub mod render;
pub mod simulation;

pub use bounds::WorldBounds;
pub use canvas::{Canvas, Colour, TextStyle};
pub use clock::FrameClock;
pub use config::{GrowthConfig, SimulationConfig, TimeStep};
pub use errors::{BodyError, OutlineError, SpawnError};
pub use frame::FrameDriver;
pub use geometry::GlyphOutline;
pub use outline::font::FontOutlines;
pub use outline::provider::GlyphOutlineProvider;
pub use outline::source::{FontState, OutlineSource};
pub use outline::table::TableOutlines;
pub use particle::{BodyId, Particle};
pub use render::{Background, RenderOptions, RenderStrategy};
pub use simulation::Simulation;
