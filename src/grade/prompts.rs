#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assembles the prompt sent with each reasoning-service call: the rubric
//! items under evaluation, the repository content relevant to the phase,
//! and the reply-format contract the parser understands.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    config::PROMPT_TRUNCATE,
    content::{ClassifiedContent, DataFileMeta},
    rubric::RubricItem,
};

/// Reply-format contract included in every prompt.
const RESPONSE_FORMAT: &str = "Respond for every rubric item listed above, using exactly this \
                               format for each one:\n\nITEM: <the item's title, verbatim>\nGRADE: \
                               <a single number drawn from the item's possible scores>\n\
                               EXPLANATION: <why you assigned this grade, naming the files that \
                               contained relevant content>\nEND_ITEM";

/// Grading instructions shared by the content-bearing phases.
const GRADING_INSTRUCTIONS: &str = "Important grading instructions:\n1. Consider ALL files shown \
                                    when grading, not just the README. Many projects put their \
                                    main content in paper.qmd, paper.Rmd, or similar files.\n2. \
                                    For citations and references, check ALL document files, not \
                                    just the README.\n3. For code-related criteria, focus on the \
                                    code files.\n4. Grade based on the overall repository \
                                    content, not any single file.";

/// Builds the critical-phase prompt: every critical item plus
/// documentation, code, and data metadata.
pub fn critical_prompt(items: &[&RubricItem], classified: &ClassifiedContent) -> String {
    let sections = vec![
        "You are grading a GitHub repository against the rubric items below. These items are \
         critical: a failing grade on any of them fails the whole submission."
            .to_string(),
        render_items(items),
        section("Documentation files", &render_files(&classified.documentation)),
        section("Code files", &render_files(&classified.code)),
        section("Data files (metadata only)", &render_data_meta(&classified.data)),
        GRADING_INSTRUCTIONS.to_string(),
        RESPONSE_FORMAT.to_string(),
    ];
    truncate_prompt(sections.join("\n\n"))
}

/// Builds the document-phase prompt: document-structure items plus the
/// documentation files only.
pub fn document_prompt(items: &[&RubricItem], classified: &ClassifiedContent) -> String {
    let sections = vec![
        "You are grading a GitHub repository against the rubric items below, which concern the \
         written document."
            .to_string(),
        render_items(items),
        section("Documentation files", &render_files(&classified.documentation)),
        GRADING_INSTRUCTIONS.to_string(),
        RESPONSE_FORMAT.to_string(),
    ];
    truncate_prompt(sections.join("\n\n"))
}

/// Builds one technical-phase prompt: the full technical item list, one
/// batch of code files, and all data metadata.
pub fn technical_prompt(
    items: &[&RubricItem],
    batch: &[(&String, &String)],
    classified: &ClassifiedContent,
) -> String {
    let code: String = batch
        .iter()
        .map(|(path, content)| format!("=== FILE: {path}\n{content}"))
        .join("\n\n");

    let sections = vec![
        "You are grading a GitHub repository against the technical rubric items below. You are \
         shown a subset of the repository's code files; grade as highly as this subset supports."
            .to_string(),
        render_items(items),
        section("Code files", &code),
        section("Data files (metadata only)", &render_data_meta(&classified.data)),
        GRADING_INSTRUCTIONS.to_string(),
        RESPONSE_FORMAT.to_string(),
    ];
    truncate_prompt(sections.join("\n\n"))
}

/// Builds the remaining-phase prompt: leftover items plus a structural
/// summary of the repository instead of raw content.
pub fn remaining_prompt(items: &[&RubricItem], classified: &ClassifiedContent) -> String {
    let sections = vec![
        "You are grading a GitHub repository against the rubric items below. You are shown the \
         repository's structure rather than raw file contents."
            .to_string(),
        render_items(items),
        section("Documentation files", &render_paths(&classified.documentation)),
        section("Code files", &render_paths(&classified.code)),
        section("Data files", &render_data_meta(&classified.data)),
        section("Other files", &render_paths(&classified.other)),
        RESPONSE_FORMAT.to_string(),
    ];
    truncate_prompt(sections.join("\n\n"))
}

/// Renders the rubric items under evaluation.
fn render_items(items: &[&RubricItem]) -> String {
    items
        .iter()
        .map(|item| {
            let values = item
                .values
                .as_ref()
                .map(|values| serde_json::to_string(values).unwrap_or_default())
                .unwrap_or_else(|| {
                    format!("any number between {} and {}", item.range.min, item.range.max)
                });

            format!(
                "Title: {}\nCriteria: {}\nPossible scores: {}\nMaximum points: {}\nIs critical: {}",
                item.title, item.criteria, values, item.range.max, item.critical
            )
        })
        .join("\n\n")
}

/// Renders full file contents with `=== FILE:` separators.
fn render_files(files: &BTreeMap<String, String>) -> String {
    files
        .iter()
        .map(|(path, content)| format!("=== FILE: {path}\n{content}"))
        .join("\n\n")
}

/// Renders only the paths of a bucket, one per line.
fn render_paths<V>(files: &BTreeMap<String, V>) -> String {
    files.keys().join("\n")
}

/// Renders data-file metadata, one file per line.
fn render_data_meta(data: &BTreeMap<String, DataFileMeta>) -> String {
    data.iter()
        .map(|(path, meta)| {
            let directory = if meta.directory.is_empty() {
                "repository root"
            } else {
                meta.directory.as_str()
            };
            format!("{path}: {} bytes, .{} file, in {directory}", meta.size, meta.extension)
        })
        .join("\n")
}

/// Titles a content section, marking it when empty.
fn section(heading: &str, body: &str) -> String {
    if body.is_empty() {
        format!("{heading}:\n(none)")
    } else {
        format!("{heading}:\n\n{body}")
    }
}

/// Bounds the rendered prompt with a hard cut and a trailing marker.
fn truncate_prompt(mut prompt: String) -> String {
    if prompt.len() > PROMPT_TRUNCATE {
        prompt.truncate(PROMPT_TRUNCATE);
        prompt.push_str("...[TRUNCATED]");
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::classify, rubric::ScoreRange};

    fn item(title: &str) -> RubricItem {
        RubricItem::builder()
            .title(title)
            .criteria("criteria text")
            .range(ScoreRange { min: 0.0, max: 10.0 })
            .values(Some(vec![0.0, 5.0, 10.0]))
            .build()
    }

    fn sample_content() -> ClassifiedContent {
        classify(
            &[
                ("README.md".to_string(), "# Project".to_string()),
                ("model.py".to_string(), "import numpy".to_string()),
                ("data/raw.csv".to_string(), "a,b\n1,2".to_string()),
                ("Makefile".to_string(), "all:".to_string()),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn critical_prompt_carries_all_buckets_and_format() {
        let binding = item("Critical check");
        let prompt = critical_prompt(&[&binding], &sample_content());

        assert!(prompt.contains("Title: Critical check"));
        assert!(prompt.contains("=== FILE: README.md"));
        assert!(prompt.contains("=== FILE: model.py"));
        assert!(prompt.contains("data/raw.csv: 7 bytes"));
        assert!(prompt.contains("END_ITEM"));
    }

    #[test]
    fn document_prompt_excludes_code_content() {
        let binding = item("Abstract");
        let prompt = document_prompt(&[&binding], &sample_content());

        assert!(prompt.contains("=== FILE: README.md"));
        assert!(!prompt.contains("import numpy"));
    }

    #[test]
    fn remaining_prompt_lists_paths_without_content() {
        let binding = item("Leftover");
        let prompt = remaining_prompt(&[&binding], &sample_content());

        assert!(prompt.contains("README.md"));
        assert!(prompt.contains("Makefile"));
        assert!(!prompt.contains("# Project"));
        assert!(!prompt.contains("import numpy"));
    }

    #[test]
    fn oversized_prompts_are_truncated_with_marker() {
        let binding = item("Big");
        let mut content = ClassifiedContent::default();
        content
            .documentation
            .insert("huge.md".to_string(), "x".repeat(PROMPT_TRUNCATE * 2));
        let prompt = document_prompt(&[&binding], &content);

        assert!(prompt.len() <= PROMPT_TRUNCATE + "...[TRUNCATED]".len());
        assert!(prompt.ends_with("...[TRUNCATED]"));
    }
}
