#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use anyhow::{Context, Result};

/// Prompt truncation length for rendered grading prompts.
pub const PROMPT_TRUNCATE: usize = 60_000;

/// GitHub API credentials and tuning parameters sourced from the
/// environment.
#[derive(Clone, Debug)]
pub struct GithubEnv {
    /// API token used for authenticated requests; unauthenticated access
    /// works at a reduced rate limit.
    token:    Option<String>,
    /// Base URL for the GitHub REST API.
    api_base: String,
    /// Per-request timeout for tree and blob fetches.
    timeout:  Duration,
}

impl GithubEnv {
    /// Construct a `GithubEnv` from environment variables.
    fn from_env() -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        let api_base = std::env::var("GITHUB_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_owned())
            .unwrap_or_else(|_| "https://api.github.com".to_string());

        Self {
            token,
            api_base,
            timeout: read_timeout_secs("GRADER_HTTP_TIMEOUT_SECS", 30),
        }
    }

    /// Returns the configured API token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the REST API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// OpenAI-compatible endpoint credentials and tuning parameters sourced
/// from the environment.
#[derive(Clone, Debug)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate requests.
    api_key:     String,
    /// Model identifier for chat completions.
    model:       String,
    /// Optional temperature override, if provided.
    temperature: Option<f32>,
    /// Per-call timeout for completion requests.
    timeout:     Duration,
}

impl OpenAiEnv {
    /// Construct an `OpenAiEnv` from environment variables; all of
    /// `OPENAI_ENDPOINT`, `OPENAI_API_KEY`, and `OPENAI_MODEL` are required.
    fn from_env() -> Result<Self> {
        let api_base = require_env("OPENAI_ENDPOINT")?;
        let api_key = require_env("OPENAI_API_KEY")?;
        let model = require_env("OPENAI_MODEL")?;

        let temperature = std::env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok());

        Ok(Self {
            api_base,
            api_key,
            model,
            temperature,
            timeout: read_timeout_secs("GRADER_LLM_TIMEOUT_SECS", 120),
        })
    }

    /// Returns the API base URL used for completion requests.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key used for completion requests.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Immutable configuration bundle built once at startup and passed by
/// reference into each component at construction.
#[derive(Clone, Debug)]
pub struct GraderConfig {
    /// GitHub API settings.
    github: GithubEnv,
    /// Reasoning-service settings.
    openai: OpenAiEnv,
}

impl GraderConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            github: GithubEnv::from_env(),
            openai: OpenAiEnv::from_env()?,
        })
    }

    /// Returns the GitHub settings.
    pub fn github(&self) -> &GithubEnv {
        &self.github
    }

    /// Returns the reasoning-service settings.
    pub fn openai(&self) -> &OpenAiEnv {
        &self.openai
    }
}

/// Reads a required environment variable, trimming whitespace and treating
/// an empty value as missing.
fn require_env(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .with_context(|| format!("{name} must be set"))?;
    Ok(value)
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
