//! All the CLI arguments for Letterfall

/// The name of the main config file in the config directory.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "letterfall.toml";

/// Letters fall from the top of your terminal, bounce and pile up at the bottom.
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about)]
#[non_exhaustive]
pub struct CliArgs {
    /// Use a custom config directory.
    #[arg(long, value_name = "Path to config directory")]
    pub config_dir: Option<std::path::PathBuf>,

    /// The name of the main config file, relative to the config directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Override the log level from the config file.
    #[arg(long, value_enum)]
    pub log_level: Option<crate::config::main::LogLevel>,

    /// Override the log file location from the config file.
    #[arg(long)]
    pub log_path: Option<std::path::PathBuf>,

    /// A TrueType or OpenType font to take letter shapes from.
    #[arg(long)]
    pub font: Option<std::path::PathBuf>,

    /// Seed the random number generator, so that every run drops the same letters.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exit after this many seconds.
    #[arg(long)]
    pub duration: Option<f32>,

    /// Don't draw to the terminal, simulate in memory instead.
    #[arg(long)]
    pub headless: bool,

    /// How many frames to simulate in headless mode.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Width in pixels of the headless canvas.
    #[arg(long, default_value_t = 400)]
    pub width: u32,

    /// Height in pixels of the headless canvas.
    #[arg(long, default_value_t = 300)]
    pub height: u32,

    /// Save the final headless frame to this PNG file.
    #[arg(long)]
    pub snapshot: Option<std::path::PathBuf>,
}
