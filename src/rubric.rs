#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Rubric definitions: the fixed ordered set of gradeable criteria, their
//! scoring ranges and criticality flags, and the assignment of each item to
//! an evaluation phase.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Inclusive numeric bounds for a rubric item's grade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ScoreRange {
    /// Lowest grade the item may receive.
    pub min: f64,
    /// Highest grade the item may receive.
    pub max: f64,
}

impl ScoreRange {
    /// Clamps a raw grade into the range.
    pub fn clamp(&self, grade: f64) -> f64 {
        grade.max(self.min).min(self.max)
    }
}

/// A single gradeable criterion.
#[derive(Clone, Debug, Serialize, Deserialize, TypedBuilder)]
pub struct RubricItem {
    /// * `title`: unique key identifying the item
    #[builder(setter(into))]
    pub title:    String,
    /// * `criteria`: text describing what to judge
    #[builder(setter(into))]
    pub criteria: String,
    /// * `range`: inclusive grade bounds
    pub range:    ScoreRange,
    /// * `values`: enumerated allowed scores, if the item restricts them
    #[serde(default)]
    #[builder(default)]
    pub values:   Option<Vec<f64>>,
    /// * `critical`: a zero grade on a critical item forces the whole
    ///   assessment to zero
    #[serde(default)]
    #[builder(default)]
    pub critical: bool,
}

/// JSON document shape the rubric ships as.
#[derive(Deserialize)]
struct RubricDocument {
    /// The ordered item list.
    rubric_items: Vec<RubricItem>,
}

/// The fixed, ordered set of rubric items for a grading run. Loaded once
/// before the first grading call and immutable thereafter.
#[derive(Clone, Debug, Serialize)]
pub struct Rubric {
    /// Items in their original (reporting) order.
    items: Vec<RubricItem>,
}

impl Rubric {
    /// Builds a rubric from an already-validated item list.
    pub fn new(items: Vec<RubricItem>) -> Result<Self> {
        ensure!(!items.is_empty(), "Rubric has no items");
        for item in &items {
            ensure!(!item.title.trim().is_empty(), "Rubric item with empty title");
            ensure!(
                item.range.min <= item.range.max,
                "Rubric item `{}` has min above max",
                item.title
            );
        }

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            ensure!(seen.insert(item.title.as_str()), "Duplicate rubric item `{}`", item.title);
        }

        Ok(Self { items })
    }

    /// Parses a rubric from its JSON document form
    /// (`{"rubric_items": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: RubricDocument =
            serde_json::from_str(json).context("Failed to parse rubric JSON")?;
        Self::new(doc.rubric_items)
    }

    /// Reads and parses a rubric file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read rubric file {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Returns the items in rubric order.
    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    /// Looks an item up by its title.
    pub fn item(&self, title: &str) -> Option<&RubricItem> {
        self.items.iter().find(|item| item.title == title)
    }

    /// Returns the items assigned to the given phase, in rubric order.
    pub fn items_in_phase(&self, phase: Phase) -> Vec<&RubricItem> {
        self.items
            .iter()
            .filter(|item| Phase::of(item) == phase)
            .collect()
    }

    /// Sum of every item's maximum grade.
    pub fn max_possible(&self) -> f64 {
        self.items.iter().map(|item| item.range.max).sum()
    }
}

/// Item titles evaluated against documentation files only.
const DOCUMENT_TITLES: &[&str] = &[
    "abstract",
    "introduction",
    "data",
    "results",
    "discussion",
    "title",
    "prose",
    "author, date, and repo",
];

/// Item titles evaluated against code files and data metadata.
const TECHNICAL_TITLES: &[&str] = &[
    "model",
    "simulation",
    "tests-simulation",
    "tests-actual",
    "reproducible workflow",
];

/// One of the four ordered groupings used to batch rubric items against
/// relevant repository content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Items whose failure vetoes the whole assessment; evaluated first.
    Critical,
    /// Document-structure items, judged on documentation files.
    Document,
    /// Technical items, judged on code batches plus data metadata.
    Technical,
    /// Catch-all for anything not graded by the first three phases.
    Remaining,
}

impl Phase {
    /// Assigns an item to its phase. Every item maps to exactly one phase:
    /// critical items always go first, titles are then matched
    /// (case-insensitively) against the document and technical sets, and
    /// everything else lands in the remaining phase.
    pub fn of(item: &RubricItem) -> Phase {
        if item.critical {
            return Phase::Critical;
        }

        let title = item.title.trim().to_lowercase();
        if DOCUMENT_TITLES.contains(&title.as_str()) {
            Phase::Document
        } else if TECHNICAL_TITLES.contains(&title.as_str()) {
            Phase::Technical
        } else {
            Phase::Remaining
        }
    }

    /// Human-readable phase name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Critical => "critical",
            Phase::Document => "document",
            Phase::Technical => "technical",
            Phase::Remaining => "remaining",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, critical: bool) -> RubricItem {
        RubricItem::builder()
            .title(title)
            .criteria("criteria")
            .range(ScoreRange { min: 0.0, max: 10.0 })
            .critical(critical)
            .build()
    }

    #[test]
    fn critical_flag_wins_over_title_keywords() {
        assert_eq!(Phase::of(&item("Abstract", true)), Phase::Critical);
        assert_eq!(Phase::of(&item("Model", true)), Phase::Critical);
    }

    #[test]
    fn titles_map_to_their_phase_case_insensitively() {
        assert_eq!(Phase::of(&item("Abstract", false)), Phase::Document);
        assert_eq!(Phase::of(&item("Author, Date, and Repo", false)), Phase::Document);
        assert_eq!(Phase::of(&item("model", false)), Phase::Technical);
        assert_eq!(Phase::of(&item("Tests-Simulation", false)), Phase::Technical);
        assert_eq!(Phase::of(&item("Citations", false)), Phase::Remaining);
    }

    #[test]
    fn every_item_gets_exactly_one_phase() {
        let titles = ["Abstract", "Model", "Citations", "R is cited", "Prose"];
        for title in titles {
            let item = item(title, false);
            let matches = [
                Phase::Critical,
                Phase::Document,
                Phase::Technical,
                Phase::Remaining,
            ]
            .iter()
            .filter(|phase| Phase::of(&item) == **phase)
            .count();
            assert_eq!(matches, 1, "{title} must land in exactly one phase");
        }
    }

    #[test]
    fn rejects_duplicate_titles() {
        let items = vec![item("A", false), item("A", false)];
        assert!(Rubric::new(items).is_err());
    }

    #[test]
    fn rejects_inverted_range() {
        let bad = RubricItem::builder()
            .title("A")
            .criteria("criteria")
            .range(ScoreRange { min: 5.0, max: 1.0 })
            .build();
        assert!(Rubric::new(vec![bad]).is_err());
    }
}
