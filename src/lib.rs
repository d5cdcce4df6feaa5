//! # gavel
//!
//! A rubric-driven autograder for GitHub repositories. Fetches a
//! repository's files, buckets them by kind, batches rubric items into
//! ordered evaluation phases, asks an LLM to grade each batch, and
//! aggregates the replies into a single score and report.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-derived configuration passed into each component
pub mod config;
/// Classifying fetched files into documentation/code/data/other buckets
pub mod content;
/// Fetching repository trees and file contents from the GitHub API
pub mod github;
/// For all things related to grading
pub mod grade;
/// The completion client used to obtain grading judgments
pub mod llm;
/// Rubric definitions and phase assignment
pub mod rubric;
/// HTTP process boundary around the grading pipeline
pub mod server;
