//! Milestone catalog
//!
//! The catalog is the fixed, ordered list of onboarding stages. Order matters
//! twice: it is the order slices are drawn in, and it is the order the keyword
//! matcher scans in (first match wins).

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Stage names of the default pizza catalog, in display order.
pub const PIZZA_STAGES: [&str; 6] = [
    "Dough - Create Account",
    "Sauce - Connect Workspace",
    "Cheese - Configure Settings",
    "Toppings - Upload Data",
    "Bake - Test Workflow",
    "Serve - Go Live",
];

/// Slice colors for the default catalog, as RGB triples.
pub const PIZZA_COLORS: [(u8, u8, u8); 6] = [
    (0xFF, 0xB3, 0x47),
    (0xFF, 0x99, 0x33),
    (0xFF, 0xD7, 0x00),
    (0xFF, 0x45, 0x00),
    (0xFF, 0x63, 0x47),
    (0xFF, 0x69, 0xB4),
];

/// Color used for stages without a palette entry.
const FALLBACK_COLOR: (u8, u8, u8) = (0xF2, 0xF2, 0xF2);

/// One step of the onboarding sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    /// Ordinal position in the catalog
    pub id: usize,
    /// Full display name, e.g. "Dough - Create Account"
    pub name: String,
    /// Lowercased matching keyword, e.g. "dough"
    pub keyword: String,
    /// Slice color (RGB)
    pub color: (u8, u8, u8),
}

impl Stage {
    /// Short label before the " - " separator ("Dough").
    pub fn label(&self) -> &str {
        self.name
            .split(" - ")
            .next()
            .map(str::trim)
            .unwrap_or(&self.name)
    }
}

/// Derive the matching keyword from a stage name.
///
/// Uses the part before `" - "` when present, otherwise the first
/// whitespace-separated token.
pub fn keyword_for(name: &str) -> String {
    let head = match name.split_once(" - ") {
        Some((head, _)) => head.trim(),
        None => name.split_whitespace().next().unwrap_or(""),
    };
    head.to_lowercase()
}

/// Ordered, immutable set of stages with unique keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    stages: Vec<Stage>,
}

impl Catalog {
    /// Build a catalog from stage names.
    ///
    /// Fails if the list is empty, a keyword is empty, or two stages share a
    /// keyword.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut stages = Vec::new();

        for (id, name) in names.into_iter().enumerate() {
            let name: String = name.into();
            let keyword = keyword_for(&name);
            if keyword.is_empty() {
                return Err(Error::Catalog(format!("stage {:?} has no keyword", name)));
            }
            if !seen.insert(keyword.clone()) {
                return Err(Error::Catalog(format!(
                    "duplicate keyword {:?} for stage {:?}",
                    keyword, name
                )));
            }
            let color = PIZZA_COLORS.get(id).copied().unwrap_or(FALLBACK_COLOR);
            stages.push(Stage {
                id,
                name,
                keyword,
                color,
            });
        }

        if stages.is_empty() {
            return Err(Error::Catalog("catalog has no stages".to_string()));
        }

        Ok(Self { stages })
    }

    /// The six-slice pizza catalog.
    pub fn pizza() -> Self {
        let stages = PIZZA_STAGES
            .iter()
            .enumerate()
            .map(|(id, name)| Stage {
                id,
                name: (*name).to_string(),
                keyword: keyword_for(name),
                color: PIZZA_COLORS[id],
            })
            .collect();
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Look up a stage by its full name.
    pub fn get(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::pizza()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pizza_keywords() {
        let catalog = Catalog::pizza();
        let keywords: Vec<_> = catalog.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(
            keywords,
            vec!["dough", "sauce", "cheese", "toppings", "bake", "serve"]
        );
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_pizza_matches_validated_constructor() {
        assert_eq!(Catalog::new(PIZZA_STAGES).unwrap(), Catalog::pizza());
    }

    #[test]
    fn test_keyword_without_separator() {
        assert_eq!(keyword_for("Launch Party"), "launch");
        assert_eq!(keyword_for("  "), "");
    }

    #[test]
    fn test_duplicate_keyword_rejected() {
        let err = Catalog::new(["Dough - One", "dough - Two"]).unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(Catalog::new(Vec::<String>::new()).is_err());
        assert!(Catalog::new(["   "]).is_err());
    }

    #[test]
    fn test_stage_label_and_lookup() {
        let catalog = Catalog::pizza();
        let serve = catalog.get("Serve - Go Live").unwrap();
        assert_eq!(serve.label(), "Serve");
        assert_eq!(serve.id, 5);
        assert!(catalog.get("Dessert").is_none());
    }
}
