pub mod event;
pub mod help;
pub mod pages;
pub mod router;
pub mod viewport;

use anyhow::{Context, Result};
use crossterm::{
    event as terminal_event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;

use event::Event;
use router::Router;

/// How long to wait for input before redrawing, so transient notices expire.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Setup the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the router against the real terminal until a quit key is pressed.
///
/// Events are handled one at a time; actions a page queues are drained
/// before the next terminal event is read. A router error ends the loop and
/// is returned once the terminal has been restored.
pub fn run(mut router: Router) -> Result<()> {
    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    let result = (|| -> Result<()> {
        let size = terminal.size().context("Failed to read terminal size")?;
        router.dispatch(Event::Resize {
            width: size.width,
            height: size.height,
        })?;

        loop {
            terminal
                .draw(|f| router.render(f))
                .context("Failed to draw frame")?;

            if router.should_quit() {
                break;
            }

            if !terminal_event::poll(POLL_INTERVAL).context("Failed to poll events")? {
                continue;
            }
            let raw = terminal_event::read().context("Failed to read event")?;
            if let Some(event) = Event::from_terminal(raw) {
                router.dispatch(event).context("Failed to handle event")?;
                router.drain().context("Failed to run page action")?;
            }
        }
        Ok(())
    })();

    // Restore terminal in all cases
    restore_terminal(&mut terminal)?;

    result
}
