//! Analytics module for onboardiq
//!
//! Read-only aggregate statistics for the admin view: total chat volume,
//! completions per stage, and how many users have started onboarding.

pub mod admin;

pub use admin::{AdminAggregator, AdminReport, StageCount};
