//! Formatting helpers shared across UIs.

use crate::session::Progress;
use chrono::{DateTime, Utc};

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_time_at(ts, Utc::now())
}

/// Relative time of `ts` as seen from `now`.
pub fn format_relative_time_at(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// Format an optional timestamp as relative time, or "never" if missing.
pub fn format_relative_time_opt(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format_relative_time(ts),
        None => "never".to_string(),
    }
}

/// One-line slice meter, e.g. `🍕🍕⬜⬜⬜⬜ 33% Progress`.
pub fn progress_line(progress: Progress) -> String {
    let done = progress.completed.min(progress.total);
    format!(
        "{}{} {}% Progress",
        "🍕".repeat(done),
        "⬜".repeat(progress.total - done),
        progress.percent()
    )
}
