//! onboardiq - gamified onboarding assistant
//!
//! Terminal UI with a chat, a pizza progress meter, and an admin dashboard.

mod app;
mod command;
mod pizza;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use onboardiq_core::{Assistant, Catalog, Config, Database};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

/// Chat your way through onboarding, one slice at a time.
#[derive(Parser, Debug)]
#[command(name = "onboardiq")]
#[command(version, about)]
struct Args {
    /// User to log in as (defaults to session.default_user from config)
    #[arg(short, long)]
    user: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        onboardiq_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("onboardiq TUI starting up");

    let db_path = config.resolved_database_path();
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let user = args
        .user
        .unwrap_or_else(|| config.session.default_user.clone());
    let assistant = Assistant::new(Catalog::pizza(), db);
    let mut app = App::new(
        assistant,
        &user,
        Duration::from_millis(config.chat.typing_delay_ms),
    )
    .with_context(|| format!("failed to start session for {}", user))?;

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("onboardiq TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<Database>,
) -> Result<()> {
    loop {
        // Update animations and deliver replies whose delay has passed
        let size = terminal.size()?;
        app.tick_animation(size.width, size.height);

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
