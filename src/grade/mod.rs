#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grading pipeline: prompt assembly, response parsing, the four-phase
//! batcher, score aggregation, and report rendering.

/// Tolerant parsing of structured grading replies
pub mod parser;
/// Four ordered evaluation phases driving the reasoning service
pub mod phases;
/// Per-phase prompt assembly
pub mod prompts;
/// Rendering aggregate results into a markdown report
pub mod report;
/// Grades, aggregate results, and score computation
pub mod results;

pub use parser::{ParsedGrade, parse_response};
pub use phases::GradePipeline;
pub use report::generate_markdown_report;
pub use results::{AggregateResult, Grade, GradeRow};
