//! Main entrypoint for running Letterfall

use std::sync::Arc;

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use crate::cli_args::CliArgs;
use crate::renderer::Renderer;
use crate::shared_state::SharedState;

/// The environment variable for setting raw `tracing` filter directives.
const LOG_FILTER_ENV: &str = "LETTERFALL_LOG";

/// Commands to control the various tasks
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum Protocol {
    /// The entire application is exiting.
    End,
    /// User's TTY is resized.
    Resize {
        /// Width of new terminal.
        width: u16,
        /// Height of new terminal.
        height: u16,
    },
    /// The config file changed.
    Config(Box<crate::config::main::Config>),
}

/// Main entrypoint
///
/// # Errors
/// When setup fails, or any of the tasks fail.
pub async fn run(state: &Arc<SharedState>) -> Result<()> {
    let cli_args = setup(state, CliArgs::parse()).await?;

    if cli_args.headless {
        return run_headless(state, &cli_args).await;
    }

    let protocol_tx = state.protocol_tx.clone();
    let users_tty_size = Renderer::get_users_tty_size()?;
    state
        .set_tty_size(
            users_tty_size.cols.try_into()?,
            users_tty_size.rows.try_into()?,
        )
        .await;

    let (surfaces_tx, surfaces_rx) = tokio::sync::mpsc::channel(2);
    let renderer = Renderer::start(Arc::clone(state), surfaces_rx, protocol_tx.clone());
    let config_handle = crate::config::main::Config::watch(Arc::clone(state));
    let shutdown_handle = start_shutdown_listener(cli_args.duration, protocol_tx.clone());

    let animation_result =
        crate::animation::Animation::start(Arc::clone(state), surfaces_tx, cli_args.font).await;
    if let Err(error) = &animation_result {
        tracing::error!("Animation: {error:?}");
    }
    broadcast_protocol_end(&protocol_tx);

    renderer.await??;
    config_handle.await??;
    shutdown_handle.await?;

    tracing::trace!("Leaving Letterfall's main `run()` function");
    animation_result
}

/// Simulate without a terminal and report what happened.
#[expect(
    clippy::print_stdout,
    reason = "Headless mode's whole output is this summary"
)]
async fn run_headless(state: &Arc<SharedState>, cli_args: &CliArgs) -> Result<()> {
    let config = state.config.read().await.clone();
    let report = crate::headless::run(config, crate::headless::HeadlessOptions::from(cli_args)).await?;

    println!(
        "Simulated {} frames: spawned {} letters, {} still live, {} resting on the floor",
        report.frames, report.spawned, report.live, report.resting
    );
    if let Some(path) = report.snapshot {
        println!("Saved final frame to {}", path.display());
    }

    Ok(())
}

/// Broadcast the `End` message on Ctrl-C, or once the requested duration has passed.
fn start_shutdown_listener(
    maybe_duration: Option<f32>,
    protocol_tx: tokio::sync::broadcast::Sender<Protocol>,
) -> tokio::task::JoinHandle<()> {
    let protocol_rx = protocol_tx.subscribe();
    tokio::spawn(async move {
        let timeout = async {
            match maybe_duration {
                Some(seconds) => {
                    let duration = std::time::Duration::try_from_secs_f32(seconds)
                        .unwrap_or(std::time::Duration::ZERO);
                    tokio::time::sleep(duration).await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(error) = result {
                        tracing::error!("Listening for Ctrl-C: {error:?}");
                        return;
                    }
                    tracing::debug!("Ctrl-C received");
                }
                () = timeout => {
                    tracing::debug!("Requested duration elapsed");
                }
                () = wait_for_end(protocol_rx) => {
                    return;
                }
            }
        }

        broadcast_protocol_end(&protocol_tx);
    })
}

/// Resolves once the `End` message arrives, or once nothing can send it any more.
async fn wait_for_end(mut protocol_rx: tokio::sync::broadcast::Receiver<Protocol>) {
    loop {
        match protocol_rx.recv().await {
            Ok(Protocol::End) | Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            Ok(_) | Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => (),
        }
    }
}

/// Signal all task loops to exit.
///
/// We keep it in its own function because we need to handle the error separately. If the error
/// were to be bubbled with `?` as usual, there's a chance it would never be logged, because the
/// protocol end signal is itself what allows the central error handler to even be reached.
pub fn broadcast_protocol_end(protocol_tx: &tokio::sync::broadcast::Sender<Protocol>) {
    tracing::debug!("Broadcasting the protocol `End` message to all listeners");
    let result = protocol_tx.send(Protocol::End);
    if let Err(error) = result {
        tracing::error!("{error:?}");
    }
}

/// Prepare the application to start: config directory, config, CLI overrides and logging.
///
/// # Errors
/// When the config directory or file is unusable, or logging can't be set up.
pub async fn setup(state: &Arc<SharedState>, cli_args: CliArgs) -> Result<CliArgs> {
    (*state.main_config_file.write().await).clone_from(&cli_args.main_config);

    let directory_result =
        crate::config::main::Config::setup_directory(cli_args.config_dir.clone(), state).await;
    if let Err(directory_error) = directory_result {
        color_eyre::eyre::bail!("Error setting up config directory: {directory_error:?}");
    }

    let config_result = crate::config::main::Config::load_config_into_shared_state(state).await;
    if let Err(config_error) = config_result {
        let path = crate::config::main::Config::main_config_path(state).await;
        color_eyre::eyre::bail!(
            "Bad config file: {config_error:?}\n\nConfig path: {}",
            path.display()
        );
    }

    if let Some(seed) = cli_args.seed {
        state.config.write().await.physics.seed = Some(seed);
    }

    setup_logging(&cli_args, state).await?;

    tracing::info!("Starting Letterfall");
    tracing::debug!("Loaded config: {:?}", state.config.read().await);

    Ok(cli_args)
}

/// Setup logging
async fn setup_logging(cli_args: &CliArgs, state: &Arc<SharedState>) -> Result<()> {
    let maybe_user_filters = std::env::var(LOG_FILTER_ENV).ok();
    let mut path = state.config.read().await.log_path.clone();

    if let Some(cli_override_path) = &cli_args.log_path {
        path.clone_from(cli_override_path);
    }

    let mut level = state.config.read().await.log_level.clone();
    if let Some(cli_override_level) = &cli_args.log_level {
        level = cli_override_level.clone();
    }
    let level_as_string = format!("{level:?}").to_lowercase();

    let is_loggable =
        !matches!(level, crate::config::main::LogLevel::Off) || maybe_user_filters.is_some();

    if !is_loggable {
        return Ok(());
    }

    let directory = path.parent().context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(&path)?;

    let filters = match maybe_user_filters {
        Some(user_filters) => tracing_subscriber::EnvFilter::builder()
            .with_default_directive("error".parse()?)
            .parse_lossy(user_filters),
        None => tracing_subscriber::EnvFilter::builder()
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("letterfall={level_as_string}").parse()?)
            .add_directive(format!("letterfall_physics={level_as_string}").parse()?)
            .add_directive(format!("tests={level_as_string}").parse()?),
    };

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_filter(filters);

    let result = tracing_subscriber::registry().with(logfile_layer).try_init();
    if let Err(error) = result {
        // Only happens when something, like a test harness, already installed a subscriber.
        tracing::debug!("Logging already initialised: {error}");
        return Ok(());
    }

    *state.is_logging.write().await = true;

    Ok(())
}
