//! # onboardiq-core
//!
//! Core library for onboardiq - a chat-driven, gamified onboarding tracker.
//!
//! This library provides:
//! - The milestone catalog and keyword matcher
//! - Per-user session state and the progress tracker
//! - The chat assistant that phrases replies
//! - Database storage layer with SQLite
//! - Admin aggregation, configuration, and logging
//!
//! ## Flow
//!
//! user text → [`matcher`] → (new stage) [`tracker`] + completion store
//! append → [`responder`] reply. The [`analytics`] aggregator reads the same
//! stores independently.
//!
//! ## Example
//!
//! ```rust,no_run
//! use onboardiq_core::{Assistant, Catalog, Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let mut assistant = Assistant::new(Catalog::pizza(), db);
//! let mut session = assistant.login("demo_user").expect("login failed");
//! let reply = assistant
//!     .respond(&mut session, "I created my dough account")
//!     .expect("respond failed");
//! println!("{}", reply.text);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{AdminAggregator, AdminReport};
pub use catalog::{Catalog, Stage};
pub use config::Config;
pub use db::{CompletionStore, Database, MemoryStore, MessageLog};
pub use error::{Error, Result};
pub use responder::{Assistant, FixedChooser, PhraseChooser, RandomChooser, Reply, ReplyKind};
pub use session::{Progress, SessionRegistry, SessionState};
pub use types::*;

// Public modules
pub mod analytics;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod matcher;
pub mod responder;
pub mod session;
pub mod tracker;
pub mod types;
