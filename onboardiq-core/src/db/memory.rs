//! In-memory store for tests and throwaway sessions.

use super::store::{CompletionStore, MessageLog};
use crate::error::Result;
use crate::types::{ChatEvent, CompletionEvent};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    progress: Vec<CompletionEvent>,
    chats: Vec<ChatEvent>,
}

/// [`CompletionStore`] and [`MessageLog`] backed by two vectors.
///
/// Record ids start at 1 and increase per table, mirroring SQLite
/// `AUTOINCREMENT`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every completion row, in insertion order.
    pub fn completions(&self) -> Vec<CompletionEvent> {
        self.tables.lock().unwrap().progress.clone()
    }
}

impl CompletionStore for MemoryStore {
    fn append_completion(&self, user: &str, stage: &str) -> Result<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.progress.len() as i64 + 1;
        tables.progress.push(CompletionEvent {
            id,
            user: user.to_string(),
            stage: stage.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn completions_for_user(&self, user: &str) -> Result<Vec<CompletionEvent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .progress
            .iter()
            .filter(|e| e.user == user)
            .cloned()
            .collect())
    }

    fn completion_counts_by_stage(&self) -> Result<BTreeMap<String, i64>> {
        let tables = self.tables.lock().unwrap();
        let mut counts = BTreeMap::new();
        for event in &tables.progress {
            *counts.entry(event.stage.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn count_distinct_users(&self) -> Result<i64> {
        let tables = self.tables.lock().unwrap();
        let users: HashSet<&str> = tables.progress.iter().map(|e| e.user.as_str()).collect();
        Ok(users.len() as i64)
    }

    fn latest_completion_at(&self) -> Result<Option<DateTime<Utc>>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.progress.last().map(|e| e.created_at))
    }
}

impl MessageLog for MemoryStore {
    fn append_chat(&self, message: &str) -> Result<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.chats.len() as i64 + 1;
        tables.chats.push(ChatEvent {
            id,
            message: message.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn count_chats(&self) -> Result<i64> {
        Ok(self.tables.lock().unwrap().chats.len() as i64)
    }

    fn recent_chats(&self, limit: usize) -> Result<Vec<ChatEvent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.chats.iter().rev().take(limit).cloned().collect())
    }
}
