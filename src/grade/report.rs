#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Renders an [`AggregateResult`] into a markdown grading report.

use chrono::Local;

use crate::{github::RepoRef, grade::results::AggregateResult, rubric::Rubric};

/// Generates the full markdown report: overall score first, then critical
/// items, then regular items. Only items that actually received a grade
/// appear in the breakdown.
pub fn generate_markdown_report(
    repo: &RepoRef,
    rubric: &Rubric,
    results: &AggregateResult,
) -> String {
    let mut report = format!(
        "# Grading Report for {}\nGenerated on: {}\n\n## Overall Score: {:.2}%\n\n## Detailed \
         Breakdown\n\n",
        repo.slug(),
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        results.total_score
    );

    let graded = |critical: bool| {
        rubric
            .items()
            .iter()
            .filter(move |item| item.critical == critical)
            .filter_map(|item| {
                results.grades.get(&item.title).map(|grade| {
                    let explanation = results
                        .explanations
                        .get(&item.title)
                        .map(String::as_str)
                        .unwrap_or_default();
                    format!(
                        "#### {} ({}/{} points)\n*{}*\n\n",
                        item.title, grade, item.range.max, explanation
                    )
                })
            })
            .collect::<String>()
    };

    let critical_section = graded(true);
    if !critical_section.is_empty() {
        report.push_str("### Critical Items\n\n");
        report.push_str(&critical_section);
    }

    report.push_str("### Regular Items\n\n");
    report.push_str(&graded(false));

    report
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::rubric::{RubricItem, ScoreRange};

    fn sample_rubric() -> Rubric {
        Rubric::new(vec![
            RubricItem::builder()
                .title("Is a real project")
                .criteria("criteria")
                .range(ScoreRange { min: 0.0, max: 10.0 })
                .critical(true)
                .build(),
            RubricItem::builder()
                .title("Abstract")
                .criteria("criteria")
                .range(ScoreRange { min: 0.0, max: 20.0 })
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn report_groups_critical_and_regular_items() {
        let rubric = sample_rubric();
        let results = AggregateResult::new(
            &rubric,
            BTreeMap::from([
                ("Is a real project".to_string(), 10.0),
                ("Abstract".to_string(), 15.0),
            ]),
            BTreeMap::from([
                ("Is a real project".to_string(), "Looks genuine.".to_string()),
                ("Abstract".to_string(), "Clear and concise.".to_string()),
            ]),
        );

        let report = generate_markdown_report(
            &RepoRef {
                owner: "octocat".to_string(),
                repo:  "hello".to_string(),
            },
            &rubric,
            &results,
        );

        assert!(report.contains("# Grading Report for octocat/hello"));
        assert!(report.contains("### Critical Items"));
        assert!(report.contains("#### Is a real project (10/10 points)"));
        assert!(report.contains("### Regular Items"));
        assert!(report.contains("#### Abstract (15/20 points)"));
        assert!(report.contains("*Clear and concise.*"));
    }

    #[test]
    fn ungraded_items_are_omitted_from_the_breakdown() {
        let rubric = sample_rubric();
        let results = AggregateResult::new(
            &rubric,
            BTreeMap::from([("Is a real project".to_string(), 0.0)]),
            BTreeMap::new(),
        );

        let report = generate_markdown_report(
            &RepoRef {
                owner: "octocat".to_string(),
                repo:  "hello".to_string(),
            },
            &rubric,
            &results,
        );

        assert!(report.contains("## Overall Score: 0.00%"));
        assert!(!report.contains("#### Abstract"));
    }
}
