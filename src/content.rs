#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Partitions fetched repository content into semantic buckets that control
//! what gets sent to the reasoning service: documentation and code travel as
//! full text, data files shrink to metadata, and everything else is listed
//! by path only.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::github::RepositoryContent;

/// Extensions classified as documentation.
const DOCUMENTATION_EXTENSIONS: &[&str] = &["md", "qmd", "rmd", "txt"];

/// Extensions classified as code.
const CODE_EXTENSIONS: &[&str] = &["py", "r", "ipynb"];

/// Extensions classified as data files.
const DATA_EXTENSIONS: &[&str] = &["csv", "parquet", "json", "xlsx", "xls", "dta", "sav", "dat"];

/// Marker stored for files in the `other` bucket, whose content is never
/// forwarded to the reasoning service.
pub const UNEVALUATED_CONTENT: &str = "[content not evaluated]";

/// Metadata kept for a data file once its raw content is discarded.
#[derive(Clone, Debug, Serialize)]
pub struct DataFileMeta {
    /// Content length in bytes.
    pub size:      usize,
    /// Lowercased file extension.
    pub extension: String,
    /// Containing directory, empty for root-level files.
    pub directory: String,
}

/// Fetched content partitioned into the four classification buckets.
/// Every non-empty input path appears in exactly one bucket.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ClassifiedContent {
    /// Documentation files, path to full text.
    pub documentation: BTreeMap<String, String>,
    /// Code files, path to full text.
    pub code:          BTreeMap<String, String>,
    /// Data files, path to retained metadata.
    pub data:          BTreeMap<String, DataFileMeta>,
    /// Everything else, path to the [`UNEVALUATED_CONTENT`] marker.
    pub other:         BTreeMap<String, String>,
}

impl ClassifiedContent {
    /// Total number of classified paths across all buckets.
    pub fn len(&self) -> usize {
        self.documentation.len() + self.code.len() + self.data.len() + self.other.len()
    }

    /// True when no path was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies fetched content by file extension. Entries with empty content
/// are dropped entirely: they carry no evaluable signal and only inflate
/// prompts.
pub fn classify(content: &RepositoryContent) -> ClassifiedContent {
    let mut classified = ClassifiedContent::default();

    for (path, text) in content {
        if text.is_empty() {
            continue;
        }

        let extension = extension_of(path);
        if DOCUMENTATION_EXTENSIONS.contains(&extension.as_str()) {
            classified.documentation.insert(path.clone(), text.clone());
        } else if CODE_EXTENSIONS.contains(&extension.as_str()) {
            classified.code.insert(path.clone(), text.clone());
        } else if DATA_EXTENSIONS.contains(&extension.as_str()) {
            classified.data.insert(path.clone(), DataFileMeta {
                size: text.len(),
                extension,
                directory: directory_of(path),
            });
        } else {
            classified
                .other
                .insert(path.clone(), UNEVALUATED_CONTENT.to_string());
        }
    }

    classified
}

/// Lowercased extension of a path, empty when there is none.
fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Containing directory of a path, empty for root-level files.
fn directory_of(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}
