//! TUI entry point and terminal setup.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::CrosstermBackend, Terminal};

use crate::config::Config;
use crate::storage::{FileStore, KeyValueStore};
use crate::tracker::Tracker;
use crate::tui::app::App;

/// How long to wait for input before checking the timer again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Initialise the terminal, run the app until the user quits, then restore it.
pub fn run_tui(tracker: Tracker<FileStore>, config: &Config) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tracker);
    let result = event_loop(&mut app, &mut terminal, config.bell);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Draw, advance the timer, and dispatch key presses until the app asks to quit.
fn event_loop<S, B>(app: &mut App<S>, terminal: &mut Terminal<B>, bell: bool) -> io::Result<()>
where
    S: KeyValueStore,
    B: Backend,
{
    loop {
        if app.on_tick(Instant::now()) > 0 && bell {
            // Terminal bell.
            let _ = io::stdout().write_all(b"\x07").and_then(|_| io::stdout().flush());
        }

        terminal.draw(|f| app.render(f))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code, key.modifiers, Instant::now()) {
                    return Ok(());
                }
            }
        }
    }
}
