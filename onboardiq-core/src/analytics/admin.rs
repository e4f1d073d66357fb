//! Admin aggregation over the completion and chat logs.
//!
//! Every query hits the stores directly; nothing is cached between calls.

use crate::catalog::Catalog;
use crate::db::{CompletionStore, MessageLog};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the per-stage breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub completions: i64,
    /// False for stored names that no longer exist in the catalog
    pub in_catalog: bool,
}

/// Everything the admin view shows, computed in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct AdminReport {
    pub total_messages: i64,
    pub users_started: i64,
    /// Stages with at least one completion
    pub completions_by_stage: BTreeMap<String, i64>,
    /// Catalog-ordered rows including zero-count stages
    pub stage_breakdown: Vec<StageCount>,
    pub last_completion_at: Option<DateTime<Utc>>,
}

impl AdminReport {
    /// Total completion rows across all stages.
    pub fn total_completions(&self) -> i64 {
        self.completions_by_stage.values().sum()
    }

    /// The catalog stage with the fewest completions, i.e. where users stall.
    pub fn bottleneck(&self) -> Option<&StageCount> {
        self.stage_breakdown
            .iter()
            .filter(|row| row.in_catalog)
            .min_by_key(|row| row.completions)
    }
}

/// Read-only queries for the admin dashboard.
pub struct AdminAggregator<'a, S> {
    store: &'a S,
}

impl<'a, S> AdminAggregator<'a, S>
where
    S: CompletionStore + MessageLog,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Number of chat messages ever submitted.
    pub fn total_messages(&self) -> Result<i64> {
        self.store.count_chats()
    }

    /// Completion counts per stage name.
    ///
    /// Stages nobody has completed are absent rather than zero; use
    /// [`Self::stage_breakdown`] for a row per catalog stage.
    pub fn completions_by_stage(&self) -> Result<BTreeMap<String, i64>> {
        self.store.completion_counts_by_stage()
    }

    /// Number of distinct users with at least one completion.
    pub fn distinct_users_started(&self) -> Result<i64> {
        self.store.count_distinct_users()
    }

    pub fn last_completion_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.store.latest_completion_at()
    }

    /// One row per catalog stage in catalog order, zero-filled, followed by
    /// any stored stage names the catalog does not know.
    pub fn stage_breakdown(&self, catalog: &Catalog) -> Result<Vec<StageCount>> {
        let counts = self.completions_by_stage()?;
        Ok(breakdown_from_counts(&counts, catalog))
    }

    pub fn report(&self, catalog: &Catalog) -> Result<AdminReport> {
        let completions_by_stage = self.completions_by_stage()?;
        let stage_breakdown = breakdown_from_counts(&completions_by_stage, catalog);
        let report = AdminReport {
            total_messages: self.total_messages()?,
            users_started: self.distinct_users_started()?,
            completions_by_stage,
            stage_breakdown,
            last_completion_at: self.last_completion_at()?,
        };
        tracing::debug!(
            total_messages = report.total_messages,
            users_started = report.users_started,
            "Admin report computed"
        );
        Ok(report)
    }
}

fn breakdown_from_counts(counts: &BTreeMap<String, i64>, catalog: &Catalog) -> Vec<StageCount> {
    let mut rows: Vec<StageCount> = catalog
        .iter()
        .map(|stage| StageCount {
            stage: stage.name.clone(),
            completions: counts.get(&stage.name).copied().unwrap_or(0),
            in_catalog: true,
        })
        .collect();

    rows.extend(
        counts
            .iter()
            .filter(|(name, _)| catalog.get(name).is_none())
            .map(|(name, count)| StageCount {
                stage: name.clone(),
                completions: *count,
                in_catalog: false,
            }),
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.append_completion("alice", "Dough - Create Account").unwrap();
        store.append_completion("bob", "Dough - Create Account").unwrap();
        store.append_completion("bob", "Sauce - Connect Workspace").unwrap();
        store.append_completion("carol", "Legacy - Old Stage").unwrap();
        for msg in ["hi", "dough", "dough", "sauce"] {
            store.append_chat(msg).unwrap();
        }
        store
    }

    #[test]
    fn test_basic_aggregates() {
        let store = seeded_store();
        let admin = AdminAggregator::new(&store);

        assert_eq!(admin.total_messages().unwrap(), 4);
        assert_eq!(admin.distinct_users_started().unwrap(), 3);

        let counts = admin.completions_by_stage().unwrap();
        assert_eq!(counts["Dough - Create Account"], 2);
        assert_eq!(counts["Sauce - Connect Workspace"], 1);
        // Zero-count stages are omitted
        assert!(!counts.contains_key("Serve - Go Live"));
    }

    #[test]
    fn test_breakdown_zero_fills_in_catalog_order() {
        let store = seeded_store();
        let admin = AdminAggregator::new(&store);
        let rows = admin.stage_breakdown(&Catalog::pizza()).unwrap();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].stage, "Dough - Create Account");
        assert_eq!(rows[0].completions, 2);
        assert_eq!(rows[5].stage, "Serve - Go Live");
        assert_eq!(rows[5].completions, 0);
        assert_eq!(rows[6].stage, "Legacy - Old Stage");
        assert!(!rows[6].in_catalog);
    }

    #[test]
    fn test_report_bundle() {
        let store = seeded_store();
        let report = AdminAggregator::new(&store)
            .report(&Catalog::pizza())
            .unwrap();

        assert_eq!(report.total_completions(), 4);
        assert!(report.last_completion_at.is_some());
        let bottleneck = report.bottleneck().unwrap();
        assert_eq!(bottleneck.completions, 0);
        assert_eq!(bottleneck.stage, "Cheese - Configure Settings");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_messages"], 4);
        assert_eq!(json["completions_by_stage"]["Dough - Create Account"], 2);
    }

    #[test]
    fn test_empty_stores() {
        let store = MemoryStore::new();
        let report = AdminAggregator::new(&store)
            .report(&Catalog::pizza())
            .unwrap();
        assert_eq!(report.total_messages, 0);
        assert_eq!(report.users_started, 0);
        assert!(report.completions_by_stage.is_empty());
        assert!(report.last_completion_at.is_none());
        assert_eq!(report.stage_breakdown.len(), 6);
    }
}
