mod app;
mod ui;

pub use app::{App, Focus};

use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use crossterm::{
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use datascope_runtime::BrowserSession;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::time::Duration;

/// Restores the terminal even when the event loop unwinds.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self> {
        execute!(io::stdout(), EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub async fn run(session: BrowserSession) -> Result<()> {
    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(session);

    while !app.should_quit() {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if crossterm::event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = crossterm::event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key).await;
        }
    }

    Ok(())
}
