//! Core domain types for onboardiq
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Stage** | One step of the onboarding sequence (a pizza slice) |
//! | **Keyword** | Lowercased leading token of a stage name, matched against chat input |
//! | **CompletionEvent** | Durable record that a user finished a stage |
//! | **ChatEvent** | Durable record of one raw chat input |
//! | **Session** | In-memory, per-user context: completed stages plus transcript |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Persisted records
// ============================================

/// A row of the `progress` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Auto-assigned row id; defines insertion order
    pub id: i64,
    /// User identifier supplied at login
    pub user: String,
    /// Full stage name
    pub stage: String,
    pub created_at: DateTime<Utc>,
}

/// A row of the `chats` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Transcript
// ============================================

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ============================================
// Tracker outcomes
// ============================================

/// Result of offering a matched stage to the progress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// First completion of this stage in the session; one event was persisted
    NewlyCompleted,
    /// The stage was already completed; nothing was written
    AlreadyCompleted,
}
