use anyhow::{Context, Result};
use api_scout::analyze::Analyzer;
use api_scout::cache::ContentCache;
use api_scout::cli::{Cli, Commands, RepoArgs};
use api_scout::config::{Settings, resolve_settings};
use api_scout::github::GitHubClient;
use api_scout::listing::list_download_urls;
use api_scout::model::AnalysisReport;
use api_scout::tree::RepoRef;
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;
    log_settings(&settings);
    let client = GitHubClient::new(&settings).context("Failed to build GitHub client")?;
    let cache = ContentCache::new();
    let analyzer = Analyzer::new(&client, &cache);

    match &cli.command {
        Commands::Analyze {
            target,
            max_files,
            report,
        } => {
            let repo = repo_ref(target);
            let max_files = Some(max_files.unwrap_or(settings.max_files));
            let outcomes = analyzer
                .analyze_controllers(&repo, max_files)
                .with_context(|| format!("Failed to analyze controllers of {repo}"))?;
            let report_data = AnalysisReport::new(outcomes, cache.stats());
            if *report {
                write_json(&report_data, target.output.as_deref())?;
            } else {
                write_json(&report_data.results, target.output.as_deref())?;
            }
        }
        Commands::Overview { target } => {
            let repo = repo_ref(target);
            let overview = analyzer
                .analyze_project_overview(&repo)
                .with_context(|| format!("Failed to analyze project overview of {repo}"))?;
            write_json(&overview, target.output.as_deref())?;
        }
        Commands::Files { target, path } => {
            let repo = repo_ref(target);
            let urls = list_download_urls(&client, &repo, path.as_deref())
                .with_context(|| format!("Failed to list files of {repo}"))?;
            write_json(&urls, target.output.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn log_settings(settings: &Settings) {
    tracing::debug!(
        api = %settings.api_base_url,
        api_version = %settings.api_version,
        authenticated = settings.token.is_some(),
        max_files = settings.max_files,
        "resolved settings"
    );
}

fn repo_ref(target: &RepoArgs) -> RepoRef {
    RepoRef::new(&target.owner, &target.repo, &target.branch)
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;

    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write output: {}", path.display()))?;
    } else {
        println!("{content}");
    }

    Ok(())
}
