//! Local play in the current terminal.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend, widgets::Paragraph};
use tracing::{error, info, instrument};

use crate::input::key_from_event;
use crate::session::{Flow, SessionController};

/// Runs one session in the current terminal until the player quits.
#[instrument]
pub fn run_local() -> Result<()> {
    info!("Starting local game");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_game_loop(&mut terminal, SessionController::new());
    let restored = restore_terminal(&mut terminal);

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    info!("Local game ended");
    res.and(restored.map_err(Into::into))
}

/// Leaves raw mode and the alternate screen and shows the cursor.
///
/// Every step runs even if an earlier one fails; the first error is
/// returned.
fn restore_terminal<W: Write>(terminal: &mut Terminal<CrosstermBackend<W>>) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw.and(screen).and(cursor)
}

/// Draws, waits for a key, updates; until the controller asks to quit.
fn run_game_loop<B: Backend>(terminal: &mut Terminal<B>, mut controller: SessionController) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        let frame = controller.render();
        terminal.draw(|f| f.render_widget(Paragraph::new(frame.as_str()), f.area()))?;

        if let Event::Key(event) = event::read()?
            && let Some(key) = key_from_event(event)
            && controller.update(key) == Flow::Quit
        {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use ratatui::layout::Rect;
    use ratatui::{TerminalOptions, Viewport};

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_restore_leaves_screen_and_shows_cursor() {
        let buffer = SharedBuffer::default();
        let mut terminal = Terminal::with_options(
            CrosstermBackend::new(buffer.clone()),
            TerminalOptions {
                viewport: Viewport::Fixed(Rect::new(0, 0, 40, 10)),
            },
        )
        .unwrap();

        // Raw mode may not be available under the test harness; the
        // escape sequences must still be written.
        let _ = restore_terminal(&mut terminal);

        let written = String::from_utf8_lossy(&buffer.0.borrow()).into_owned();
        assert!(written.contains("\x1b[?1049l"), "{written:?}");
        assert!(written.contains("\x1b[?25h"), "{written:?}");
    }
}
