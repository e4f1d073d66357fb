//! Per-user session state and the registry that owns it.
//!
//! A [`SessionState`] is the in-memory mirror of one user's progress. It is
//! seeded from the [`CompletionStore`] at login and afterwards only grows; the
//! store remains the durable record.

use crate::catalog::Catalog;
use crate::db::CompletionStore;
use crate::error::Result;
use crate::types::Turn;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Completed-stage count relative to the catalog size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction complete in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed.min(self.total)) as f64 / self.total as f64
    }

    /// Whole-number percentage in `[0, 100]`, rounded down.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// In-memory state for one user's interaction.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    user: String,
    completed: Vec<String>,
    completed_index: HashSet<String>,
    transcript: Vec<Turn>,
}

impl SessionState {
    /// A session with nothing completed.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    /// Start a session for `user`, restoring stages they completed earlier.
    ///
    /// Stored names not present in `catalog` are skipped, as are repeats, so
    /// the completed set stays bounded by the catalog size.
    pub fn seed<S: CompletionStore>(
        user: impl Into<String>,
        catalog: &Catalog,
        store: &S,
    ) -> Result<Self> {
        let mut session = Self::new(user);
        for event in store.completions_for_user(&session.user)? {
            if catalog.get(&event.stage).is_some() {
                session.mark_completed(&event.stage);
            }
        }
        tracing::info!(
            user = %session.user,
            completed = session.completed.len(),
            "Session seeded from store"
        );
        Ok(session)
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Completed stage names in completion order.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn is_completed(&self, stage: &str) -> bool {
        self.completed_index.contains(stage)
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn progress(&self, catalog: &Catalog) -> Progress {
        Progress {
            completed: self.completed.len(),
            total: catalog.len(),
        }
    }

    /// Add `stage` to the completed set. Returns false if it was already there.
    pub(crate) fn mark_completed(&mut self, stage: &str) -> bool {
        if !self.completed_index.insert(stage.to_string()) {
            return false;
        }
        self.completed.push(stage.to_string());
        true
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }
}

/// Active sessions keyed by user identifier.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, SessionState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `user`, seeding a new one from the store if the
    /// user has no active session.
    pub fn login<S: CompletionStore>(
        &mut self,
        user: &str,
        catalog: &Catalog,
        store: &S,
    ) -> Result<&mut SessionState> {
        match self.sessions.entry(user.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let session = SessionState::seed(user, catalog, store)?;
                Ok(entry.insert(session))
            }
        }
    }

    pub fn get(&self, user: &str) -> Option<&SessionState> {
        self.sessions.get(user)
    }

    pub fn get_mut(&mut self, user: &str) -> Option<&mut SessionState> {
        self.sessions.get_mut(user)
    }

    /// End a session, handing back its state.
    pub fn logout(&mut self, user: &str) -> Option<SessionState> {
        self.sessions.remove(user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
