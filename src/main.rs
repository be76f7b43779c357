use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use git_release::cli::{run_release_workflow, OutputFormat, ReleaseWorkflowArgs};
use git_release::config;
use git_release::ui;
use git_release::ReleaseError;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    version,
    about = "Compute the next semantic version from conventional commits and tag it"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Branch to release (default: checked-out branch)")]
    branch: Option<String>,

    #[arg(short, long, help = "Path inside the git repository")]
    repo: Option<PathBuf>,

    #[arg(long, help = "Compute the release without creating a tag")]
    dry_run: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown, help = "Output format")]
    format: OutputFormat,

    #[arg(long, value_name = "FILE", help = "Write the changelog to FILE")]
    changelog_out: Option<PathBuf>,

    #[arg(long, help = "Show configured branches and exit")]
    list: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if args.list {
        return list_configured_branches(args.config.as_deref());
    }

    let workflow_args = ReleaseWorkflowArgs {
        config_path: args.config,
        branch: args.branch,
        repo_path: args.repo,
        dry_run: args.dry_run,
        format: args.format,
        changelog_out: args.changelog_out,
    };

    match run_release_workflow(workflow_args).await {
        Ok(result) => {
            if !result.output.is_empty() {
                println!("{}", result.output.trim_end());
            }
            Ok(())
        }
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            if let Some(release_error) = e.downcast_ref::<ReleaseError>() {
                if release_error.is_retryable() {
                    ui::display_status("Rerunning with the same inputs is safe");
                }
            }
            std::process::exit(1);
        }
    }
}

fn list_configured_branches(config_path: Option<&str>) -> Result<()> {
    let config = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    if config.branches.is_empty() {
        ui::display_error("No branches configured in release.toml");
        std::process::exit(1);
    }
    ui::display_available_branches(&config.branches);
    Ok(())
}
