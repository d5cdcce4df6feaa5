#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Drives the four ordered evaluation phases. Each phase batches its
//! rubric items with phase-relevant content and issues one completion call
//! per prompt, strictly sequentially: the critical phase gates everything
//! after it, and the technical phase merges batch results by keeping the
//! highest grade seen per item.

use std::collections::BTreeMap;

use crate::{
    content::{ClassifiedContent, classify},
    github::RepositoryContent,
    grade::{parser::parse_response, prompts, results::AggregateResult},
    llm::CompletionClient,
    rubric::{Phase, Rubric, RubricItem},
};

/// Number of code files included in each technical-phase prompt.
const CODE_BATCH_SIZE: usize = 3;

/// How a phase folds freshly parsed grades into the grades collected so
/// far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MergePolicy {
    /// Replace whatever was recorded before.
    Overwrite,
    /// Keep the highest grade seen, with its paired explanation. A later
    /// batch may raise but never lower an item's grade.
    HighestGrade,
}

/// The grading pipeline for one run. Owns no shared state: every run
/// builds its own grade mappings from scratch.
pub struct GradePipeline<'a, C> {
    /// The immutable rubric for this run.
    rubric: &'a Rubric,
    /// The completion client judging each prompt.
    client: &'a C,
}

impl<'a, C: CompletionClient> GradePipeline<'a, C> {
    /// Builds a pipeline over the given rubric and completion client.
    pub fn new(rubric: &'a Rubric, client: &'a C) -> Self {
        Self { rubric, client }
    }

    /// Grades fetched repository content through all four phases and
    /// aggregates the result. Completion-call failures degrade to
    /// zero-grade entries for the affected items; only the caller-supplied
    /// content feeds the judgment, so this never errors.
    pub async fn grade(&self, content: &RepositoryContent) -> AggregateResult {
        let classified = classify(content);
        let mut grades: BTreeMap<String, f64> = BTreeMap::new();
        let mut explanations: BTreeMap<String, String> = BTreeMap::new();

        self.run_critical_phase(&classified, &mut grades, &mut explanations)
            .await;

        if self.critical_failure(&grades) {
            tracing::warn!("A critical rubric item was graded 0; skipping the remaining phases");
            return AggregateResult::new(self.rubric, grades, explanations);
        }

        self.run_document_phase(&classified, &mut grades, &mut explanations)
            .await;
        self.run_technical_phase(&classified, &mut grades, &mut explanations)
            .await;
        self.run_remaining_phase(&classified, &mut grades, &mut explanations)
            .await;

        AggregateResult::new(self.rubric, grades, explanations)
    }

    /// True when any critical item has received a grade of exactly 0,
    /// whether from genuine evaluation or from the call-failure fallback.
    fn critical_failure(&self, grades: &BTreeMap<String, f64>) -> bool {
        self.rubric
            .items_in_phase(Phase::Critical)
            .iter()
            .any(|item| grades.get(&item.title) == Some(&0.0))
    }

    /// Phase 1: all critical items in one prompt over documentation, code,
    /// and data metadata.
    async fn run_critical_phase(
        &self,
        classified: &ClassifiedContent,
        grades: &mut BTreeMap<String, f64>,
        explanations: &mut BTreeMap<String, String>,
    ) {
        let items = self.rubric.items_in_phase(Phase::Critical);
        if items.is_empty() {
            return;
        }

        tracing::info!("Grading {} critical item(s)", items.len());
        let prompt = prompts::critical_prompt(&items, classified);
        self.grade_batch(&items, &prompt, MergePolicy::Overwrite, grades, explanations)
            .await;
    }

    /// Phase 2: document-structure items in one prompt over documentation
    /// files only.
    async fn run_document_phase(
        &self,
        classified: &ClassifiedContent,
        grades: &mut BTreeMap<String, f64>,
        explanations: &mut BTreeMap<String, String>,
    ) {
        let items = self.rubric.items_in_phase(Phase::Document);
        if items.is_empty() {
            return;
        }

        tracing::info!("Grading {} document item(s)", items.len());
        let prompt = prompts::document_prompt(&items, classified);
        self.grade_batch(&items, &prompt, MergePolicy::Overwrite, grades, explanations)
            .await;
    }

    /// Phase 3: technical items over code batches of [`CODE_BATCH_SIZE`],
    /// one prompt per batch, merging by highest grade. With no code files
    /// there are no batches and the items fall through to the remaining
    /// phase.
    async fn run_technical_phase(
        &self,
        classified: &ClassifiedContent,
        grades: &mut BTreeMap<String, f64>,
        explanations: &mut BTreeMap<String, String>,
    ) {
        let items = self.rubric.items_in_phase(Phase::Technical);
        if items.is_empty() {
            return;
        }

        let code: Vec<(&String, &String)> = classified.code.iter().collect();

        tracing::info!(
            "Grading {} technical item(s) across {} code batch(es)",
            items.len(),
            code.len().div_ceil(CODE_BATCH_SIZE)
        );

        for batch in code.chunks(CODE_BATCH_SIZE) {
            let prompt = prompts::technical_prompt(&items, batch, classified);
            self.grade_batch(&items, &prompt, MergePolicy::HighestGrade, grades, explanations)
                .await;
        }
    }

    /// Phase 4: anything still ungraded, judged against a structural
    /// summary instead of raw content. This is the catch-all that
    /// guarantees total rubric coverage.
    async fn run_remaining_phase(
        &self,
        classified: &ClassifiedContent,
        grades: &mut BTreeMap<String, f64>,
        explanations: &mut BTreeMap<String, String>,
    ) {
        let items: Vec<&RubricItem> = self
            .rubric
            .items()
            .iter()
            .filter(|item| !grades.contains_key(&item.title))
            .collect();
        if items.is_empty() {
            return;
        }

        tracing::info!("Grading {} remaining item(s)", items.len());
        let prompt = prompts::remaining_prompt(&items, classified);
        self.grade_batch(&items, &prompt, MergePolicy::Overwrite, grades, explanations)
            .await;
    }

    /// Issues one completion call and folds the parsed grades for the
    /// listed items into the collected state. A failed call becomes a
    /// zero grade with an error explanation for every item in the batch;
    /// it never aborts the run.
    async fn grade_batch(
        &self,
        items: &[&RubricItem],
        prompt: &str,
        policy: MergePolicy,
        grades: &mut BTreeMap<String, f64>,
        explanations: &mut BTreeMap<String, String>,
    ) {
        let parsed = match self.client.complete(prompt).await {
            Ok(reply) => parse_response(&reply),
            Err(err) => {
                tracing::warn!("Completion call failed: {err:#}");
                for item in items {
                    grades.insert(item.title.clone(), 0.0);
                    explanations
                        .insert(item.title.clone(), format!("Error during grading: {err}"));
                }
                return;
            }
        };

        for item in items {
            let Some(entry) = parsed.get(&item.title) else {
                continue;
            };
            let grade = item.range.clamp(entry.grade);

            match policy {
                MergePolicy::Overwrite => {
                    grades.insert(item.title.clone(), grade);
                    explanations.insert(item.title.clone(), entry.explanation.clone());
                }
                MergePolicy::HighestGrade => {
                    let current = grades.get(&item.title).copied();
                    if current.is_none_or(|existing| grade > existing) {
                        grades.insert(item.title.clone(), grade);
                        explanations.insert(item.title.clone(), entry.explanation.clone());
                    }
                }
            }
        }
    }
}
