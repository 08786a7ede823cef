//! All of the user config for Letterfall.

use color_eyre::eyre::ContextCompat as _;
use color_eyre::eyre::Result;

/// A copy of the default config file. It gets copied to the user's config folder the first time
/// they start Letterfall.
static DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// The valid log levels. Based on our `tracing` crate.
#[derive(serde::Deserialize, clap::ValueEnum, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error
    Error,
    /// Warnings
    Warn,
    /// Info
    Info,
    /// Debug
    Debug,
    /// Trace
    Trace,
    /// No logging
    Off,
}

/// Managing user config.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// The maximum log level
    pub log_level: LogLevel,
    /// The location of the log file.
    pub log_path: std::path::PathBuf,
    /// Target frame rate
    pub frame_rate: u32,
    /// How often a new letter drops, in milliseconds.
    pub spawn_interval_ms: u64,
    /// A font to take letter shapes from. Common system fonts are tried when it's not set.
    pub font_path: Option<std::path::PathBuf>,
    /// The distance, in pixels, between points sampled along a glyph's curves.
    pub font_sample_length: f32,
    /// How frames look.
    pub render: letterfall_physics::RenderOptions,
    /// How letters move.
    pub physics: letterfall_physics::SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        let log_directory = match dirs::state_dir() {
            Some(directory) => directory,
            None => std::path::PathBuf::new().join("./"),
        };
        let log_path = log_directory.join("letterfall").join("letterfall.log");

        Self {
            log_level: LogLevel::Off,
            log_path,
            frame_rate: 30,
            spawn_interval_ms: 1000,
            font_path: None,
            font_sample_length: TERMINAL_SAMPLE_LENGTH,
            render: letterfall_physics::RenderOptions::default(),
            physics: terminal_physics(),
        }
    }
}

/// Terminal letters are only a few pixels high, so their curves need sampling finely.
const TERMINAL_SAMPLE_LENGTH: f32 = 1.0;

/// The metric preset scaled down to a terminal's chunky half-block pixels. Gravity is 9.8m/s² at
/// 5 pixels per metre.
fn terminal_physics() -> letterfall_physics::SimulationConfig {
    let mut physics = letterfall_physics::SimulationConfig::metric();
    physics.gravity = 49.0;
    physics.rest_speed = 4.0;
    physics.min_size = 6.0;
    physics.max_size = 16.0;
    physics.growth.max_size = 16.0;
    physics.spawn_height = 10.0;
    physics
}

/// Recursively overlay one TOML table onto another. Tables are merged key by key, any other
/// value replaces the base's.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let (Some(toml::Value::Table(base_table)), toml::Value::Table(override_table)) =
            (base.get_mut(&key), &value)
        {
            merge_tables(base_table, override_table.clone());
            continue;
        }
        base.insert(key, value);
    }
}

impl Config {
    /// Canonical path to the config directory.
    pub async fn directory(
        state: &std::sync::Arc<crate::shared_state::SharedState>,
    ) -> std::path::PathBuf {
        state.config_path.read().await.clone()
    }

    /// Get the stable location of Letterfall's config directory on the user's system.
    ///
    /// # Errors
    /// When the OS has no standard config directory.
    pub fn default_directory() -> Result<std::path::PathBuf> {
        Ok(dirs::config_dir()
            .context("Couldn't get standard config directory")?
            .join("letterfall"))
    }

    /// Figure out where our config is being stored, and create the directory if needed.
    ///
    /// # Errors
    /// When the directory can't be created.
    pub async fn setup_directory(
        maybe_custom_path: Option<std::path::PathBuf>,
        state: &std::sync::Arc<crate::shared_state::SharedState>,
    ) -> Result<()> {
        let path = match maybe_custom_path {
            None => Self::default_directory()?,
            Some(path_string) => std::path::PathBuf::new().join(path_string),
        };

        tokio::fs::create_dir_all(&path).await?;
        *state.config_path.write().await = path;

        Ok(())
    }

    /// Canonical path to the main config file.
    pub async fn main_config_path(
        state: &std::sync::Arc<crate::shared_state::SharedState>,
    ) -> std::path::PathBuf {
        let directory = Self::directory(state).await;
        let main_config_file = state.main_config_file.read().await.clone();
        directory.join(main_config_file)
    }

    /// Load the main config, writing the default config first if there isn't one yet.
    ///
    /// # Errors
    /// When the config file can't be read or isn't valid.
    pub async fn load(state: &std::sync::Arc<crate::shared_state::SharedState>) -> Result<Self> {
        let config_path = Self::main_config_path(state).await;
        let config_file_name = config_path
            .file_name()
            .context("Couldn't get file name from config path")?;
        let is_default_config = config_file_name == crate::cli_args::DEFAULT_CONFIG_FILE_NAME;
        if is_default_config && !config_path.exists() {
            tokio::fs::write(&config_path, DEFAULT_CONFIG).await?;
        }

        tracing::info!("(Re)loading the main Letterfall config from: {config_path:?}");
        match tokio::fs::read_to_string(&config_path).await {
            Ok(data) => {
                tracing::trace!("Using config file:\n{data}");
                Self::parse(&data)
            }
            Err(err) => {
                tracing::error!("Loading config: {err:?}");
                color_eyre::eyre::bail!(
                    "Couldn't load config at {config_path:?}: {}",
                    err.to_string()
                );
            }
        }
    }

    /// Parse config from TOML. Missing keys, including ones inside a partially given table,
    /// get their values from the default config.
    ///
    /// # Errors
    /// When the TOML is invalid or has values of the wrong type.
    pub fn parse(data: &str) -> Result<Self> {
        let mut merged = toml::from_str::<toml::Table>(DEFAULT_CONFIG)?;
        merge_tables(&mut merged, toml::from_str::<toml::Table>(data)?);
        Ok(toml::Value::Table(merged).try_into::<Self>()?)
    }

    /// Parse the shipped default config.
    ///
    /// # Errors
    /// Only if the bundled config file is itself broken.
    pub fn parse_default_config() -> Result<Self> {
        Ok(toml::from_str::<Self>(DEFAULT_CONFIG)?)
    }

    /// Load the main config and store it in the shared state.
    ///
    /// # Errors
    /// When the config can't be loaded.
    pub async fn load_config_into_shared_state(
        state: &std::sync::Arc<crate::shared_state::SharedState>,
    ) -> Result<Self> {
        let new_config = Self::load(state).await?;
        *state.config.write().await = new_config.clone();

        Ok(new_config)
    }

    /// Watch the config file for any changes and then automatically update the shared state with
    /// the contents of the new config file.
    pub fn watch(
        state: std::sync::Arc<crate::shared_state::SharedState>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move {
            let path = Self::directory(&state).await;
            tracing::debug!("Watching config ({path:?}) for changes.");

            let (config_file_change_tx, mut config_file_change_rx) = tokio::sync::mpsc::channel(1);
            let mut protocol_rx = state.protocol_tx.subscribe();

            let mut debouncer = notify_debouncer_full::new_debouncer(
                std::time::Duration::from_millis(100),
                None,
                move |result: notify_debouncer_full::DebounceEventResult| match result {
                    Ok(events) => {
                        for event in events {
                            let send_result = config_file_change_tx.blocking_send(event.clone());
                            if let Err(error) = send_result {
                                tracing::error!(
                                    "Sending config file watcher notification: {error:?}"
                                );
                            }
                        }
                    }
                    Err(error) => tracing::error!("File watcher: {error:?}"),
                },
            )?;
            debouncer.watch(
                &path,
                notify_debouncer_full::notify::RecursiveMode::NonRecursive,
            )?;

            #[expect(
                clippy::integer_division_remainder_used,
                reason = "This is caused by the `tokio::select!`"
            )]
            loop {
                tokio::select! {
                    Some(event) = config_file_change_rx.recv() => {
                        Self::handle_file_change_event(event, &state).await;
                    },
                    Ok(message) = protocol_rx.recv() => {
                        if matches!(message, crate::run::Protocol::End) {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Leaving config watcher loop");
            Ok(())
        })
    }

    /// Handle an event from the config file watcher. Only data changes to the main config file
    /// trigger a reload.
    async fn handle_file_change_event(
        event: notify_debouncer_full::DebouncedEvent,
        state: &std::sync::Arc<crate::shared_state::SharedState>,
    ) {
        use notify_debouncer_full::notify::event as notify_event;
        let notify_event::EventKind::Modify(kind) = event.kind else {
            return;
        };
        let notify_event::ModifyKind::Data(_) = kind else {
            return;
        };
        let main_config_path = Self::main_config_path(state).await;
        let is_main_config = event
            .paths
            .iter()
            .any(|path| path.file_name() == main_config_path.file_name());
        if !is_main_config {
            return;
        }

        tracing::debug!(
            "Config file change detected ({:?}), updating shared state.",
            event.paths
        );

        match Self::load_config_into_shared_state(state).await {
            Ok(config) => {
                state
                    .protocol_tx
                    .send(crate::run::Protocol::Config(Box::new(config)))
                    .unwrap_or_else(|send_error| {
                        tracing::error!(
                            "Couldn't send config update on protocol channel: {send_error:?}"
                        );
                        0
                    });
            }
            Err(error) => {
                tracing::warn!(
                    "Ignoring config update, keeping the previous config: {}",
                    error.root_cause()
                );
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_file_parses() {
        let config = Config::parse_default_config().unwrap();
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.spawn_interval_ms, 1000);
        assert_eq!(config.log_level, LogLevel::Off);
        assert_eq!(
            config.physics.time_step,
            letterfall_physics::TimeStep::Seconds
        );
        assert!(!config.physics.pairwise_collisions);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::parse(
            r#"
            frame_rate = 60

            [render]
            background = "trail"

            [physics]
            time_step = "per_frame"
            population_cap = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.spawn_interval_ms, 1000);
        assert_eq!(
            config.render.background,
            letterfall_physics::Background::Trail
        );
        assert_eq!(
            config.render.strategy,
            letterfall_physics::RenderStrategy::Outline
        );
        assert_eq!(config.physics.population_cap, 12);
        assert_eq!(
            config.physics.time_step,
            letterfall_physics::TimeStep::PerFrame
        );
    }

    #[test]
    fn default_config_file_matches_the_code_defaults() {
        assert_eq!(Config::parse_default_config().unwrap(), Config::default());
    }

    #[test]
    fn partial_physics_table_keeps_terminal_scale() {
        let config = Config::parse("[physics]\ngravity = 10.0").unwrap();
        assert!((config.physics.gravity - 10.0).abs() < f32::EPSILON);
        assert!((config.physics.max_size - 16.0).abs() < f32::EPSILON);
        assert!((config.physics.growth.max_size - 16.0).abs() < f32::EPSILON);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(Config::parse("frame_rate = \"fast\"").is_err());
    }

    #[tokio::test]
    async fn first_load_writes_the_default_config() {
        let directory = tempfile::tempdir().unwrap();
        let (protocol_tx, _) = tokio::sync::broadcast::channel(4);
        let state = crate::shared_state::SharedState::init(10, 10, protocol_tx);
        Config::setup_directory(Some(directory.path().to_path_buf()), &state)
            .await
            .unwrap();
        *state.main_config_file.write().await = crate::cli_args::DEFAULT_CONFIG_FILE_NAME.into();

        let config = Config::load_config_into_shared_state(&state).await.unwrap();

        assert!(directory
            .path()
            .join(crate::cli_args::DEFAULT_CONFIG_FILE_NAME)
            .exists());
        assert_eq!(*state.config.read().await, config);
    }
}
