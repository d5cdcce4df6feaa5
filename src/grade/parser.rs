#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Parses the free-text reply of one reasoning-service call into per-item
//! grades. The format is line-oriented:
//!
//! ```text
//! ITEM: <title>
//! GRADE: <number>
//! EXPLANATION: <text, possibly over several lines>
//! END_ITEM
//! ```
//!
//! Parsing never fails: malformed blocks are dropped, an unparseable grade
//! becomes 0, and a missing explanation becomes the empty string.

use std::collections::BTreeMap;

/// Grade and explanation extracted for one rubric item title.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedGrade {
    /// The numeric grade as written by the model, before clamping.
    pub grade:       f64,
    /// Joined explanation text; empty when none was found.
    pub explanation: String,
}

/// Extracts all complete `(title, grade, explanation)` blocks from a reply.
/// A block counts as complete once it has a title line and a `GRADE:` line;
/// later blocks for the same title overwrite earlier ones.
pub fn parse_response(text: &str) -> BTreeMap<String, ParsedGrade> {
    let mut parsed = BTreeMap::new();

    // Everything before the first marker is preamble.
    for segment in text.split("ITEM:").skip(1) {
        let mut lines = segment.lines();
        let Some(title) = lines.next().map(str::trim) else {
            continue;
        };
        if title.is_empty() {
            continue;
        }

        let mut grade: Option<f64> = None;
        let mut explanation: Vec<String> = Vec::new();
        let mut in_explanation = false;

        for line in lines {
            let trimmed = line.trim();
            if trimmed == "END_ITEM" {
                break;
            }

            if let Some(rest) = trimmed.strip_prefix("GRADE:") {
                grade = Some(rest.trim().parse::<f64>().unwrap_or(0.0));
                in_explanation = false;
            } else if let Some(rest) = trimmed.strip_prefix("EXPLANATION:") {
                in_explanation = true;
                let rest = rest.trim();
                if !rest.is_empty() {
                    explanation.push(rest.to_string());
                }
            } else if in_explanation && !trimmed.is_empty() {
                explanation.push(trimmed.to_string());
            }
        }

        // Both a title and a grade are required; explanation may be empty.
        if let Some(grade) = grade {
            parsed.insert(title.to_string(), ParsedGrade {
                grade,
                explanation: explanation.join(" "),
            });
        }
    }

    parsed
}
