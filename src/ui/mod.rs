//! Terminal front-end: key gate screen and chat screen

pub mod app;
pub mod conversation;

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

pub use app::App;

const TICK_RATE: Duration = Duration::from_millis(250);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Take over the terminal, run the app until it quits, then restore the terminal
pub async fn run(app: &mut App) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        original_hook(info);
    }));

    let mut terminal = restore_on_error(setup_terminal, restore_terminal)?;

    let result = event_loop(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Best effort; used where the original error matters more
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Undo a partial setup when any step of it fails
fn restore_on_error<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().inspect_err(|_| restore())
}

async fn event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    info!("UI started");
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if app.should_quit() {
            break;
        }

        if !event::poll(TICK_RATE)? {
            app.tick();
            continue;
        }

        if let Event::Key(key) = event::read()? {
            let app_event = app.handle_key(key);
            // Network calls block the loop, so show the indicator first
            if app.begin(&app_event) {
                terminal.draw(|frame| app.render(frame))?;
            }
            app.dispatch(app_event).await;
        }
    }
    info!("UI stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_setup_restores_the_terminal() {
        let restored = Cell::new(false);
        let result: Result<()> = restore_on_error(
            || Err(anyhow::anyhow!("Failed to create terminal")),
            || restored.set(true),
        );

        assert!(result.is_err());
        assert!(restored.get());
    }

    #[test]
    fn successful_setup_leaves_the_terminal_alone() {
        let restored = Cell::new(false);
        let value = restore_on_error(|| Ok(7), || restored.set(true)).unwrap();

        assert_eq!(value, 7);
        assert!(!restored.get());
    }
}
