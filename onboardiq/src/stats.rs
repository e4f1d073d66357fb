//! onboardiq-stats - print the admin dashboard
//!
//! Aggregates the completion and chat logs and prints them as text or JSON.

use anyhow::{Context, Result};
use clap::Parser;
use onboardiq_core::analytics::{AdminAggregator, AdminReport};
use onboardiq_core::format::format_relative_time_opt;
use onboardiq_core::{Catalog, Config, Database};

#[derive(Parser)]
#[command(name = "onboardiq-stats")]
#[command(about = "Show onboarding completion stats")]
#[command(version)]
struct Args {
    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Include stages nobody has completed yet
    #[arg(short, long)]
    all: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.format != "text" && args.format != "json" {
        anyhow::bail!("Unknown format '{}' (expected text or json)", args.format);
    }

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        onboardiq_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = config.resolved_database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let report = AdminAggregator::new(&db)
        .report(&Catalog::pizza())
        .context("failed to aggregate stats")?;

    tracing::info!(
        total_messages = report.total_messages,
        users_started = report.users_started,
        "Admin report generated"
    );

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, args.all);
    }

    Ok(())
}

fn print_text(report: &AdminReport, all: bool) {
    println!("📊 OnboardIQ Admin Dashboard");
    println!();
    println!("Total Chat Messages: {}", report.total_messages);
    println!("Users Started Onboarding: {}", report.users_started);
    println!(
        "Last Completion: {}",
        format_relative_time_opt(report.last_completion_at)
    );
    println!();
    println!("Slice Completion Stats");

    if all {
        for row in &report.stage_breakdown {
            let marker = if row.in_catalog { "" } else { " (retired)" };
            println!("{} → {} completions{}", row.stage, row.completions, marker);
        }
    } else if report.completions_by_stage.is_empty() {
        println!("No completions yet.");
    } else {
        for (stage, count) in &report.completions_by_stage {
            println!("{} → {} completions", stage, count);
        }
    }

    if let Some(row) = report.bottleneck() {
        println!();
        println!("Bottleneck: {} ({} completions)", row.stage, row.completions);
    }
}
