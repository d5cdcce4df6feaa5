#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gavel
//!
//! A rubric-driven autograder for GitHub repositories. Point it at a
//! repository URL and a rubric file and it fetches the repository's
//! contents, asks an LLM to judge each rubric item, and produces a score
//! and a markdown report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use chrono::Local;
use dotenvy::dotenv;
use gavel::{
    config::GraderConfig,
    github::{RepoFetcher, RepoRef},
    grade::{GradePipeline, generate_markdown_report},
    llm::OpenAiCompletion,
    rubric::Rubric,
    server,
};
use tabled::{
    Table,
    settings::{Modify, Panel, Style, Width, object::Rows},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a repository and write a report
    Grade(PathBuf, Option<PathBuf>, String),
    /// Run the grading HTTP service
    Serve(PathBuf, u16),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the rubric file path
    fn r() -> impl Parser<PathBuf> {
        long("rubric")
            .help("Path to the rubric JSON file")
            .argument::<PathBuf>("PATH")
            .fallback(PathBuf::from("data/rubric.json"))
    }

    /// parses the optional report output path
    fn o() -> impl Parser<Option<PathBuf>> {
        long("output")
            .help("Where to write the markdown report")
            .argument::<PathBuf>("PATH")
            .optional()
    }

    /// parses the repository URL
    fn u() -> impl Parser<String> {
        positional("URL").help("GitHub repository URL")
    }

    /// parses the listen port
    fn p() -> impl Parser<u16> {
        long("port")
            .help("Port to listen on")
            .argument::<u16>("PORT")
            .fallback(10000)
    }

    let grade = construct!(Cmd::Grade(r(), o(), u()))
        .to_options()
        .command("grade")
        .help("Grade a GitHub repository against the rubric");

    let serve = construct!(Cmd::Serve(r(), p()))
        .to_options()
        .command("serve")
        .help("Serve the grading API over HTTP");

    let cmd = construct!([grade, serve]);

    cmd.to_options()
        .descr("Rubric-driven repository grader")
        .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();

    match cmd {
        Cmd::Grade(rubric_path, output, url) => {
            let config = GraderConfig::from_env()?;
            let rubric = Rubric::from_path(&rubric_path)?;
            let repo = RepoRef::parse(&url)?;

            let fetcher = RepoFetcher::new(config.github())?;
            let content = fetcher.fetch(&repo).await?;

            let client = OpenAiCompletion::new(config.openai());
            let pipeline = GradePipeline::new(&rubric, &client);
            let results = pipeline.grade(&content).await;

            eprintln!(
                "{}",
                Table::new(results.table_rows(&rubric))
                    .with(Panel::header(format!("Grading results for {}", repo.slug())))
                    .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
                    .with(Style::modern())
            );

            let report = generate_markdown_report(&repo, &rubric, &results);
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "grading_report_{}_{}_{}.md",
                    repo.owner,
                    repo.repo,
                    Local::now().format("%Y%m%d_%H%M%S")
                ))
            });
            std::fs::write(&path, report)
                .with_context(|| format!("Could not write report to {}", path.display()))?;

            println!("Overall score: {:.2}%", results.total_score);
            println!("Grading complete! Report saved to {}", path.display());
        }
        Cmd::Serve(rubric_path, port) => {
            let config = GraderConfig::from_env()?;
            let rubric = Rubric::from_path(&rubric_path)?;
            server::serve(config, rubric, port).await?;
        }
    };

    Ok(())
}
