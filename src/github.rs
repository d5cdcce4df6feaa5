#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Fetches a repository's full file tree from the GitHub API and decodes
//! each blob's content. A failed tree listing is fatal to the run; a failed
//! or undecodable blob degrades to a sentinel value for that file only.

use std::collections::BTreeMap;

use anyhow::{Result, ensure};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use futures::{StreamExt, stream};
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::Deserialize;

use crate::config::GithubEnv;

/// Sentinel substituted when a file's bytes cannot be decoded as text.
pub const PLACEHOLDER_CONTENT: &str =
    "[File content could not be decoded - binary or unsupported encoding]";

/// Maximum number of blob fetches in flight at once.
const FETCH_CONCURRENCY: usize = 8;

/// Mapping from file path to decoded text, one entry per fetched blob.
pub type RepositoryContent = BTreeMap<String, String>;

/// An owner/repository pair identifying a repository on the hosting API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo:  String,
}

impl RepoRef {
    /// Parses a full `https://github.com/{owner}/{repo}` URL.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim().trim_end_matches('/');
        let rest = url
            .strip_prefix("https://github.com/")
            .ok_or_else(|| anyhow::anyhow!("Invalid GitHub URL. Must start with 'https://github.com/'"))?;

        let mut parts = rest.split('/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        ensure!(
            !owner.is_empty() && !repo.is_empty(),
            "Invalid GitHub URL: expected https://github.com/owner/repo"
        );

        Ok(Self {
            owner: owner.to_string(),
            repo:  repo.trim_end_matches(".git").to_string(),
        })
    }

    /// Returns the `owner/repo` form.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Errors that abort a fetch. Individual blob failures never surface here;
/// they degrade to per-file sentinel values instead.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The recursive tree listing came back with a non-success status.
    #[error("Error fetching repo contents for {slug}: {status}")]
    TreeListing {
        /// The `owner/repo` being fetched.
        slug:   String,
        /// HTTP status the API returned.
        status: StatusCode,
    },
    /// The tree listing request could not be completed at all.
    #[error("Could not reach the GitHub API")]
    Transport(#[from] reqwest::Error),
}

/// One entry of the recursive tree listing.
#[derive(Debug, Deserialize)]
struct TreeEntry {
    /// Path of the entry relative to the repository root.
    path:  String,
    /// Entry kind; blobs are files.
    #[serde(rename = "type")]
    kind:  String,
    /// API URL for fetching this entry's content.
    url:   Option<String>,
}

/// Response shape of the recursive tree listing.
#[derive(Debug, Deserialize)]
struct TreeResponse {
    /// All entries, files and directories alike.
    tree: Vec<TreeEntry>,
}

/// Response shape of a blob content fetch.
#[derive(Debug, Deserialize)]
struct BlobResponse {
    /// Base64-encoded file bytes.
    content: String,
}

/// Retrieves a repository's file tree and contents from the GitHub API.
pub struct RepoFetcher<'a> {
    /// GitHub settings (token, base URL, timeout).
    env:    &'a GithubEnv,
    /// Shared HTTP client.
    client: Client,
}

impl<'a> RepoFetcher<'a> {
    /// Builds a fetcher with a timeout-bounded HTTP client.
    pub fn new(env: &'a GithubEnv) -> Result<Self> {
        let client = Client::builder()
            .timeout(env.timeout())
            .user_agent("gavel-grader")
            .build()?;
        Ok(Self { env, client })
    }

    /// Fetches the full recursive file tree for `repo` and decodes every
    /// blob's content. Returns one entry per blob; files that fail to fetch
    /// map to an empty string and files that fail to decode map to
    /// [`PLACEHOLDER_CONTENT`].
    pub async fn fetch(&self, repo: &RepoRef) -> Result<RepositoryContent, FetchError> {
        let entries = self.fetch_tree(repo).await?;
        tracing::info!("Fetched tree for {} ({} entries)", repo.slug(), entries.len());

        let blobs = entries
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .filter_map(|entry| entry.url.map(|url| (entry.path, url)));

        // Fetches run concurrently but land in a BTreeMap keyed by path, so
        // the assembled mapping is identical regardless of completion order.
        let contents: Vec<(String, String)> = stream::iter(blobs)
            .map(|(path, url)| async move {
                let content = self.fetch_blob(&path, &url).await;
                (path, content)
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        Ok(contents.into_iter().collect())
    }

    /// Lists the recursive tree, trying the `main` branch first and falling
    /// back to `master`.
    async fn fetch_tree(&self, repo: &RepoRef) -> Result<Vec<TreeEntry>, FetchError> {
        let mut last_status = StatusCode::NOT_FOUND;
        for branch in ["main", "master"] {
            let url = format!(
                "{}/repos/{}/{}/git/trees/{branch}?recursive=1",
                self.env.api_base(),
                repo.owner,
                repo.repo
            );

            let response = self.request(&url).send().await?;
            if response.status().is_success() {
                let body: TreeResponse = response.json().await?;
                return Ok(body.tree);
            }
            last_status = response.status();
        }

        Err(FetchError::TreeListing {
            slug:   repo.slug(),
            status: last_status,
        })
    }

    /// Fetches and decodes one blob. Any failure degrades to an empty
    /// string for this file only.
    async fn fetch_blob(&self, path: &str, url: &str) -> String {
        let response = match self.request(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!("Fetching {path} returned {}; using empty content", response.status());
                return String::new();
            }
            Err(err) => {
                tracing::warn!("Fetching {path} failed: {err}; using empty content");
                return String::new();
            }
        };

        match response.json::<BlobResponse>().await {
            Ok(blob) => decode_blob(&blob.content),
            Err(err) => {
                tracing::warn!("Reading blob body for {path} failed: {err}; using empty content");
                String::new()
            }
        }
    }

    /// Starts a request with the standard GitHub headers.
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = self.env.token() {
            builder = builder.header("Authorization", format!("token {token}"));
        }
        builder
    }
}

/// Base64-decodes a blob body and converts the bytes to text under the
/// prioritized encoding list. Substitutes [`PLACEHOLDER_CONTENT`] when no
/// decoding applies.
fn decode_blob(encoded: &str) -> String {
    // The API wraps base64 content with newlines.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let Ok(bytes) = BASE64.decode(compact.as_bytes()) else {
        return PLACEHOLDER_CONTENT.to_string();
    };

    decode_text(&bytes).unwrap_or_else(|| PLACEHOLDER_CONTENT.to_string())
}

/// Attempts decoding as UTF-8 first, then as Latin-1, which accepts any
/// byte sequence but rejects control-character-heavy content that is
/// clearly binary.
fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    // Latin-1 maps every byte to the code point of the same value, so the
    // conversion itself is total; treat a meaningful share of non-text
    // control bytes as a binary file instead.
    let control = bytes
        .iter()
        .filter(|b| b.is_ascii_control() && !matches!(b, b'\n' | b'\r' | b'\t'))
        .count();
    if bytes.is_empty() || control * 20 > bytes.len() {
        return None;
    }

    Some(bytes.iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_repo_url() {
        let parsed = RepoRef::parse("https://github.com/octocat/hello-world").unwrap();
        assert_eq!(parsed.owner, "octocat");
        assert_eq!(parsed.repo, "hello-world");
    }

    #[test]
    fn strips_trailing_slash_and_git_suffix() {
        let parsed = RepoRef::parse("https://github.com/octocat/hello.git/").unwrap();
        assert_eq!(parsed.slug(), "octocat/hello");
    }

    #[test]
    fn rejects_non_github_urls() {
        assert!(RepoRef::parse("https://gitlab.com/a/b").is_err());
        assert!(RepoRef::parse("github.com/a/b").is_err());
        assert!(RepoRef::parse("https://github.com/only-owner").is_err());
    }

    #[test]
    fn decodes_utf8_blob() {
        let encoded = BASE64.encode("fn main() {}\n");
        assert_eq!(decode_blob(&encoded), "fn main() {}\n");
    }

    #[test]
    fn decodes_latin1_fallback() {
        // 0xE9 is é in Latin-1 and invalid as standalone UTF-8.
        let encoded = BASE64.encode([b'c', b'a', b'f', 0xE9]);
        assert_eq!(decode_blob(&encoded), "café");
    }

    #[test]
    fn binary_blob_degrades_to_placeholder() {
        let encoded = BASE64.encode([0x00, 0x01, 0x02, 0xFF, 0x00, 0x03]);
        assert_eq!(decode_blob(&encoded), PLACEHOLDER_CONTENT);
    }

    #[test]
    fn invalid_base64_degrades_to_placeholder() {
        assert_eq!(decode_blob("!!not base64!!"), PLACEHOLDER_CONTENT);
    }
}
