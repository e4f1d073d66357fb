//! onboardiq-chat - line-oriented onboarding chat
//!
//! Reads one message per line from stdin and prints the assistant's reply.
//! `/login <user>` switches the active session.

mod command;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use onboardiq_core::format::progress_line;
use onboardiq_core::responder::CELEBRATION_MESSAGE;
use onboardiq_core::{Assistant, Catalog, Config, Database, ReplyKind, SessionRegistry};

use crate::command::{parse_line, Command};

#[derive(Parser)]
#[command(name = "onboardiq-chat")]
#[command(about = "Chat with the onboarding assistant over stdin/stdout")]
#[command(version)]
struct Args {
    /// User to log in as (defaults to session.default_user from config)
    #[arg(short, long)]
    user: Option<String>,

    /// Print the slice meter after every completion
    #[arg(long)]
    meter: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        onboardiq_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = config.resolved_database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let mut assistant = Assistant::new(Catalog::pizza(), db);
    let mut registry = SessionRegistry::new();
    let mut user = args
        .user
        .unwrap_or_else(|| config.session.default_user.clone());
    assistant
        .login_into(&mut registry, &user)
        .with_context(|| format!("failed to log in as {}", user))?;

    tracing::info!(user = %user, "Line chat started");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match parse_line(&line) {
            Command::Empty => continue,
            Command::Login(name) => {
                let session = assistant
                    .login_into(&mut registry, &name)
                    .with_context(|| format!("failed to log in as {}", name))?;
                let percent = session.progress(assistant.catalog()).percent();
                writeln!(out, "Logged in as {} ({}% complete)", name, percent)?;
                user = name;
            }
            Command::Say(text) => {
                let session = assistant
                    .login_into(&mut registry, &user)
                    .with_context(|| format!("failed to log in as {}", user))?;
                let reply = assistant
                    .respond(session, &text)
                    .context("failed to record message")?;
                writeln!(out, "{}", reply.text)?;

                if args.meter && matches!(reply.kind, ReplyKind::NewlyCompleted(_)) {
                    writeln!(out, "{}", progress_line(session.progress(assistant.catalog())))?;
                }
                if reply.celebrate {
                    writeln!(out, "{}", CELEBRATION_MESSAGE)?;
                }
            }
        }
        out.flush()?;
    }

    let progress = registry
        .get(&user)
        .map(|s| s.progress(assistant.catalog()))
        .context("active session missing")?;
    writeln!(out, "Progress: {}%", progress.percent())?;

    tracing::info!(user = %user, percent = progress.percent(), "Line chat finished");
    Ok(())
}
