//! Database layer for onboardiq
//!
//! This module provides the storage layer with:
//! - Repository traits for the completion and chat logs
//! - A SQLite implementation with schema migrations
//! - An in-memory implementation for tests

pub mod memory;
pub mod repo;
pub mod schema;
pub mod store;

pub use memory::MemoryStore;
pub use repo::Database;
pub use store::{CompletionStore, MessageLog};
