//! Draw animation frames to the user's terminal

use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::sync::mpsc;

use termwiz::surface::Change as TermwizChange;
use termwiz::terminal::buffered::BufferedTerminal;
use termwiz::terminal::{ScreenSize, Terminal as TermwizTerminal};

use crate::shared_state::SharedState;
use crate::surface::Surface;

/// Microseconds in a second.
pub const ONE_MICROSECOND: u64 = 1_000_000;

/// `Render`
pub(crate) struct Renderer {
    /// Shared app state
    pub state: Arc<SharedState>,
    /// The terminal's width
    pub width: u16,
    /// The terminal's height
    pub height: u16,
}

impl Renderer {
    /// Create a renderer to render to a user's terminal
    pub fn new(state: Arc<SharedState>) -> Result<Self> {
        let size = Self::get_users_tty_size()?;
        Ok(Self {
            state,
            width: size.cols.try_into()?,
            height: size.rows.try_into()?,
        })
    }

    /// Instantiate and run
    pub fn start(
        state: Arc<SharedState>,
        surfaces_rx: mpsc::Receiver<Surface>,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let protocol_rx = protocol_tx.subscribe();
        tokio::spawn(async move {
            match Self::new(Arc::clone(&state)) {
                Ok(mut renderer) => {
                    let result = renderer
                        .run(surfaces_rx, protocol_rx, protocol_tx.clone())
                        .await;

                    if let Err(error) = result {
                        crate::run::broadcast_protocol_end(&protocol_tx);
                        return Err(error);
                    };
                }
                Err(error) => {
                    crate::run::broadcast_protocol_end(&protocol_tx);
                    return Err(error);
                }
            };

            Ok(())
        })
    }

    /// We need this just because `BufferedTerminal::new()` won't take a `Box<dyn Terminal>`
    fn get_termwiz_terminal() -> Result<impl TermwizTerminal> {
        let capabilities = termwiz::caps::Capabilities::new_from_env()?;
        Ok(termwiz::terminal::new_terminal(capabilities)?)
    }

    /// Just for initialisation
    pub fn get_users_tty_size() -> Result<ScreenSize> {
        let mut terminal = Self::get_termwiz_terminal()?;
        Ok(terminal.get_screen_size()?)
    }

    /// Get the user's current terminal size and propogate it
    pub async fn handle_resize<T: TermwizTerminal + Send>(
        &mut self,
        composited_terminal: &mut BufferedTerminal<T>,
        protocol_tx: &tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<()> {
        let is_resized = composited_terminal.check_for_resize()?;
        if !is_resized {
            return Ok(());
        }

        composited_terminal.repaint()?;

        let (width, height) = composited_terminal.dimensions();
        self.width = width.try_into()?;
        self.height = height.try_into()?;
        tracing::debug!("Terminal resized to {}x{}", self.width, self.height);
        self.state.set_tty_size(self.width, self.height).await;
        protocol_tx.send(crate::run::Protocol::Resize {
            width: self.width,
            height: self.height,
        })?;

        Ok(())
    }

    /// Listen for new frames from the animation.
    /// It lives in its own method so that we can catch any errors and ensure that the user's
    /// terminal always leaves the alternate screen and gets its cursor back.
    async fn run(
        &mut self,
        mut surfaces: mpsc::Receiver<Surface>,
        mut protocol_rx: tokio::sync::broadcast::Receiver<crate::run::Protocol>,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<()> {
        tracing::debug!("Switching user's terminal to the alternate screen");
        let mut copy_of_users_terminal = Self::get_termwiz_terminal()?;
        copy_of_users_terminal.enter_alternate_screen()?;
        let mut composited_terminal = BufferedTerminal::new(copy_of_users_terminal)?;
        composited_terminal.add_changes(vec![
            TermwizChange::CursorVisibility(termwiz::surface::CursorVisibility::Hidden),
            TermwizChange::ClearScreen(termwiz::color::ColorAttribute::Default),
        ]);
        composited_terminal.flush()?;

        let result = self
            .render_loop(&mut surfaces, &mut protocol_rx, &protocol_tx, &mut composited_terminal)
            .await;

        tracing::debug!("Giving the user's terminal back");
        composited_terminal.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Visible,
        ));
        composited_terminal.flush()?;
        composited_terminal.terminal().exit_alternate_screen()?;

        result
    }

    /// Render every frame that arrives until the protocol says to stop.
    async fn render_loop<T: TermwizTerminal + Send>(
        &mut self,
        surfaces: &mut mpsc::Receiver<Surface>,
        protocol_rx: &mut tokio::sync::broadcast::Receiver<crate::run::Protocol>,
        protocol_tx: &tokio::sync::broadcast::Sender<crate::run::Protocol>,
        composited_terminal: &mut BufferedTerminal<T>,
    ) -> Result<()> {
        tracing::debug!("Starting render loop");
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "`tokio::select! generates this.`"
        )]
        loop {
            tokio::select! {
                Some(surface) = surfaces.recv() => {
                    self.handle_resize(composited_terminal, protocol_tx).await?;
                    Self::render(&surface, composited_terminal)?;
                }
                Ok(message) = protocol_rx.recv() => {
                    if matches!(message, crate::run::Protocol::End) {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Exited render loop");

        Ok(())
    }

    /// Do a single render to the user's actual terminal. It uses a diffing algorithm to make
    /// the minimum number of changes.
    fn render(
        surface: &Surface,
        composited_terminal: &mut BufferedTerminal<impl TermwizTerminal>,
    ) -> Result<()> {
        // Frames made before a resize arrived are skipped, the next one will fit.
        if surface.surface.dimensions() != composited_terminal.dimensions() {
            tracing::trace!(
                "Skipping {}x{} frame for a {:?} terminal",
                surface.width,
                surface.height,
                composited_terminal.dimensions()
            );
            return Ok(());
        }

        composited_terminal.draw_from_screen(&surface.surface, 0, 0);

        // This is where we actually render to the user's real terminal.
        composited_terminal.flush()?;

        Ok(())
    }
}
