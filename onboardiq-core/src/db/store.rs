//! Repository traits for the two append-only logs.
//!
//! Everything that reads or writes progress goes through these traits so the
//! tracker and aggregator can run against SQLite or an in-memory double.

use crate::error::Result;
use crate::types::{ChatEvent, CompletionEvent};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Durable log of (user, stage) completions.
pub trait CompletionStore {
    /// Append a completion and return its record id.
    ///
    /// No uniqueness is enforced; callers are responsible for not recording a
    /// pair twice.
    fn append_completion(&self, user: &str, stage: &str) -> Result<i64>;

    /// All completions for `user`, in insertion order.
    fn completions_for_user(&self, user: &str) -> Result<Vec<CompletionEvent>>;

    /// Completion counts keyed by stage name. Stages with no rows are absent.
    fn completion_counts_by_stage(&self) -> Result<BTreeMap<String, i64>>;

    /// Number of distinct users with at least one completion.
    fn count_distinct_users(&self) -> Result<i64>;

    /// Timestamp of the most recent completion, if any.
    fn latest_completion_at(&self) -> Result<Option<DateTime<Utc>>>;
}

/// Durable log of raw chat inputs.
pub trait MessageLog {
    /// Append a chat message and return its record id.
    fn append_chat(&self, message: &str) -> Result<i64>;

    /// Total number of logged messages.
    fn count_chats(&self) -> Result<i64>;

    /// Most recent messages, newest first.
    fn recent_chats(&self, limit: usize) -> Result<Vec<ChatEvent>>;
}

impl<T: CompletionStore + ?Sized> CompletionStore for &T {
    fn append_completion(&self, user: &str, stage: &str) -> Result<i64> {
        (**self).append_completion(user, stage)
    }

    fn completions_for_user(&self, user: &str) -> Result<Vec<CompletionEvent>> {
        (**self).completions_for_user(user)
    }

    fn completion_counts_by_stage(&self) -> Result<BTreeMap<String, i64>> {
        (**self).completion_counts_by_stage()
    }

    fn count_distinct_users(&self) -> Result<i64> {
        (**self).count_distinct_users()
    }

    fn latest_completion_at(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).latest_completion_at()
    }
}

impl<T: MessageLog + ?Sized> MessageLog for &T {
    fn append_chat(&self, message: &str) -> Result<i64> {
        (**self).append_chat(message)
    }

    fn count_chats(&self) -> Result<i64> {
        (**self).count_chats()
    }

    fn recent_chats(&self, limit: usize) -> Result<Vec<ChatEvent>> {
        (**self).recent_chats(limit)
    }
}
