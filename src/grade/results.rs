#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Aggregate grading results and the overall-score computation.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::rubric::Rubric;

#[derive(Clone, Default, Serialize, Deserialize)]
/// A struct representing a grade
pub struct Grade {
    /// The actual grade received
    pub grade:  f64,
    /// The maximum grade possible
    pub out_of: f64,
}

impl Grade {
    /// Creates a new grade -
    /// * `grade` - The actual grade received
    /// * `out_of` - The maximum grade possible
    pub fn new(grade: f64, out_of: f64) -> Self {
        Self { grade, out_of }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}/{:.2}", self.grade, self.out_of)
    }
}

#[derive(Tabled, Clone)]
/// One row of the terminal grade table.
pub struct GradeRow {
    #[tabled(rename = "Rubric item")]
    /// * `title`: the rubric item graded
    pub title:       String,
    #[tabled(rename = "Grade")]
    /// * `grade`: grade received, as `x/y`
    pub grade:       Grade,
    #[tabled(rename = "Explanation")]
    /// * `explanation`: the model's reasoning, if any was produced
    pub explanation: String,
}

/// The outcome of one grading run: per-item grades and explanations plus
/// the normalized overall score. Constructed fresh per run and never
/// shared across runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Grade per rubric item title; items never graded are absent.
    pub grades:       BTreeMap<String, f64>,
    /// Explanation per rubric item title; may be empty strings.
    pub explanations: BTreeMap<String, String>,
    /// Normalized overall score in `[0, 100]`.
    pub total_score:  f64,
}

impl AggregateResult {
    /// Builds the result from collected grades, computing the overall
    /// score against the rubric.
    pub fn new(
        rubric: &Rubric,
        grades: BTreeMap<String, f64>,
        explanations: BTreeMap<String, String>,
    ) -> Self {
        let total_score = total_score(rubric, &grades);
        Self {
            grades,
            explanations,
            total_score,
        }
    }

    /// Rows for the terminal grade table, in rubric order. Ungraded items
    /// show a zero grade so the table always covers the full rubric.
    pub fn table_rows(&self, rubric: &Rubric) -> Vec<GradeRow> {
        rubric
            .items()
            .iter()
            .map(|item| GradeRow {
                title:       item.title.clone(),
                grade:       Grade::new(
                    self.grades.get(&item.title).copied().unwrap_or(0.0),
                    item.range.max,
                ),
                explanation: self
                    .explanations
                    .get(&item.title)
                    .cloned()
                    .unwrap_or_else(|| "Not graded.".to_string()),
            })
            .collect()
    }
}

/// Computes the normalized overall score. Iterates the rubric in its
/// original order; a critical item graded 0 zeroes the whole score.
/// Ungraded items contribute nothing to the total but their maximum still
/// counts, so unfinished work scores as zero rather than being excluded.
pub fn total_score(rubric: &Rubric, grades: &BTreeMap<String, f64>) -> f64 {
    let mut total = 0.0;
    let mut max_possible = 0.0;

    for item in rubric.items() {
        max_possible += item.range.max;
        if let Some(grade) = grades.get(&item.title) {
            if item.critical && *grade == 0.0 {
                return 0.0;
            }
            total += grade;
        }
    }

    if max_possible > 0.0 {
        (total / max_possible) * 100.0
    } else {
        0.0
    }
}
