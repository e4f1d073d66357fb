//! Keyword matching of free-text chat input against the catalog.

use crate::catalog::{Catalog, Stage};

/// Find the stage whose keyword occurs in `input`.
///
/// Matching is a case-insensitive substring test. The catalog is scanned in
/// order and the first hit wins, regardless of where in the input it occurs.
pub fn match_stage<'a>(input: &str, catalog: &'a Catalog) -> Option<&'a Stage> {
    let lower = input.to_lowercase();
    catalog.iter().find(|stage| lower.contains(&stage.keyword))
}
