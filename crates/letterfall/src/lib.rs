//! Letterfall: letters falling, bouncing and piling up in your terminal

pub mod animation;
pub mod cli_args;
/// All the user-configurable settings.
pub mod config {
    pub mod main;
}
pub mod fonts;
pub mod headless;
pub mod pixel_canvas;
pub mod renderer;
pub mod run;
pub mod shared_state;
pub mod surface;
