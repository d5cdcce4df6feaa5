#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Thin HTTP boundary around the grading pipeline: one endpoint that
//! accepts a repository URL and returns either a full result payload or a
//! single error message. No grading decisions live here.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::GraderConfig,
    github::{RepoFetcher, RepoRef},
    grade::{AggregateResult, GradePipeline},
    llm::OpenAiCompletion,
    rubric::Rubric,
};

/// Shared immutable state handed to each request.
struct AppState {
    /// Configuration for the fetcher and completion client.
    config: GraderConfig,
    /// The rubric, loaded once at startup.
    rubric: Rubric,
}

/// Request body for the grading endpoint.
#[derive(Deserialize)]
struct GradeRequest {
    /// Full `https://github.com/owner/repo` URL.
    #[serde(rename = "repoUrl")]
    repo_url: Option<String>,
}

/// Response envelope for the grading endpoint.
#[derive(Serialize)]
struct GradeResponse {
    /// Whether grading completed.
    success: bool,
    /// Full results on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    data:    Option<AggregateResult>,
    /// Single error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    error:   Option<String>,
}

impl GradeResponse {
    /// Success payload.
    fn ok(data: AggregateResult) -> Self {
        Self {
            success: true,
            data:    Some(data),
            error:   None,
        }
    }

    /// Failure payload with a single message.
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data:    None,
            error:   Some(message.into()),
        }
    }
}

/// Starts the HTTP server on the given port and blocks until shutdown.
pub async fn serve(config: GraderConfig, rubric: Rubric, port: u16) -> Result<()> {
    let state = Arc::new(AppState { config, rubric });
    let app = Router::new()
        .route("/api/grade", post(grade_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Could not bind to port {port}"))?;
    tracing::info!("Listening on port {port}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Grades the requested repository. 400 for a missing or invalid URL, 500
/// for any grading failure, 200 with the full payload otherwise.
async fn grade_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GradeRequest>,
) -> (StatusCode, Json<GradeResponse>) {
    let Some(repo_url) = request.repo_url.filter(|url| !url.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(GradeResponse::err("Repository URL is required")),
        );
    };

    let repo = match RepoRef::parse(&repo_url) {
        Ok(repo) => repo,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, Json(GradeResponse::err(err.to_string())));
        }
    };

    match grade_repository(&state, &repo).await {
        Ok(results) => (StatusCode::OK, Json(GradeResponse::ok(results))),
        Err(err) => {
            tracing::error!("Grading {} failed: {err:#}", repo.slug());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GradeResponse::err(err.to_string())),
            )
        }
    }
}

/// Runs one full grading pass. Each invocation owns its own fetcher,
/// client, and result mappings.
async fn grade_repository(state: &AppState, repo: &RepoRef) -> Result<AggregateResult> {
    let fetcher = RepoFetcher::new(state.config.github())?;
    let content = fetcher.fetch(repo).await?;

    let client = OpenAiCompletion::new(state.config.openai());
    let pipeline = GradePipeline::new(&state.rubric, &client);
    Ok(pipeline.grade(&content).await)
}
