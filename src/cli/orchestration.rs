//! Main workflow orchestration logic
//!
//! Reads the repository, hands the batch to [`ReleaseOrchestrator`] and
//! reports the outcome. Argument parsing stays in `main.rs` so the workflow
//! can be driven programmatically.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::boundary::BoundaryWarning;
use crate::config::load_config;
use crate::domain::TagPattern;
use crate::git::{Git2Repository, TagRepository};
use crate::release::{discover_previous, OrchestrationResult, ReleaseContext, ReleaseOrchestrator};
use crate::ui;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Arguments for the release workflow
///
/// Mirrors the CLI flags without depending on clap's parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// Branch to release; defaults to the checked-out branch
    pub branch: Option<String>,

    /// Repository location; defaults to the current directory
    pub repo_path: Option<PathBuf>,

    /// Compute the release without creating a tag
    pub dry_run: bool,

    pub format: OutputFormat,

    /// Write the Markdown changelog here when a release is due
    pub changelog_out: Option<PathBuf>,
}

/// Result of a finished workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub branch: String,
    pub outcome: OrchestrationResult,
    /// Rendered in the requested format
    pub output: String,
}

/// Run one release for a branch of a repository on disk.
///
/// Tag conflicts and indeterminate tag creation come back as errors; every
/// other outcome, including "nothing to release", is a `WorkflowResult`.
pub async fn run_release_workflow(args: ReleaseWorkflowArgs) -> Result<WorkflowResult> {
    let config =
        load_config(args.config_path.as_deref()).context("Failed to load configuration")?;
    config.validate()?;

    let repo_path = args
        .repo_path
        .clone()
        .unwrap_or_else(|| Path::new(".").to_path_buf());
    let repository = Git2Repository::open(&repo_path)
        .with_context(|| format!("No git repository at {}", repo_path.display()))?;

    let branch = match args.branch.clone() {
        Some(branch) => branch,
        None => repository.current_branch()?,
    };
    let policy = config.policy_for(&branch)?.clone();
    let initial = config.versioning.initial_version()?;

    let tags = repository
        .find_tags_matching(&TagPattern::new(policy.version_prefix.as_str()).glob_all())
        .await
        .context("Failed to list existing tags")?;
    let previous = discover_previous(&tags, &policy, &initial);
    for warning in &previous.warnings {
        ui::display_boundary_warning(warning);
    }

    let since = previous.tag.as_ref().map(|t| t.name.as_str());
    let commits = repository
        .commits_since(since, &branch)
        .with_context(|| format!("Failed to read commits on branch '{}'", branch))?;
    if let (Some(tag), true) = (&previous.tag, commits.is_empty()) {
        ui::display_boundary_warning(&BoundaryWarning::NoNewCommits {
            latest_tag: tag.name.clone(),
        });
    }

    let ctx = ReleaseContext {
        branch_name: branch.clone(),
        previous_version: previous.version,
        target_revision: Some(repository.branch_head(&branch)?),
        commits_since_previous: commits,
        existing_tags: tags,
    };
    tracing::info!(
        branch = %branch,
        previous = %ctx.previous_version,
        commits = ctx.commits_since_previous.len(),
        dry_run = args.dry_run,
        "evaluating release"
    );

    let orchestrator = ReleaseOrchestrator::new(repository, config)?;
    let outcome = if args.dry_run {
        orchestrator.plan(&ctx).await?
    } else {
        orchestrator.run(&ctx).await?
    };

    ui::display_rejections(&outcome.rejected);
    ui::display_result(&outcome, args.dry_run);

    if let (Some(path), true) = (&args.changelog_out, outcome.decision.should_release) {
        fs::write(path, ui::render_markdown(&outcome.decision.changelog))
            .with_context(|| format!("Failed to write changelog to {}", path.display()))?;
        ui::display_success(&format!("Changelog written to {}", path.display()));
    }

    let output = render_output(&outcome, args.format)?;
    Ok(WorkflowResult {
        branch,
        outcome,
        output,
    })
}

/// Render an outcome for stdout
///
/// Markdown prints the changelog only when a release is due; JSON always
/// prints the whole outcome, rejected commits included.
pub fn render_output(outcome: &OrchestrationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown if outcome.decision.should_release => {
            Ok(ui::render_markdown(&outcome.decision.changelog))
        }
        OutputFormat::Markdown => Ok(String::new()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}
