//! Just `main()`. Keep as small as possible.

use color_eyre::eyre::Result;
use letterfall::{run, shared_state};

/// Messages can queue up on the protocol channel when a task is slow to read them.
const PROTOCOL_CHANNEL_CAPACITY: usize = 64;

#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "It's our central place for communicating with the user on CLI"
)]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let (protocol_tx, _) = tokio::sync::broadcast::channel(PROTOCOL_CHANNEL_CAPACITY);
    let state_arc = shared_state::SharedState::init(0, 0, protocol_tx);
    let result = run::run(&std::sync::Arc::clone(&state_arc)).await;

    let logpath = state_arc.config.read().await.log_path.clone();
    let is_logging = *state_arc.is_logging.read().await;
    tracing::debug!("Letterfall is exiting");

    match result {
        Ok(()) => {
            if is_logging {
                println!("Logs saved to {}", logpath.display());
            }
        }
        Err(error) => {
            tracing::error!("{error:?}");
            eprintln!("Error: {error}");
            if is_logging {
                eprintln!("See {} for more details", logpath.display());
            }
        }
    }

    Ok(())
}
