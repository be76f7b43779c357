//! Pure formatting functions for UI output.
//!
//! `render_*` functions build strings and have no side effects; `display_*`
//! functions print them with colour. Only `display_available_branches` writes
//! to stdout, which otherwise carries the rendered changelog alone.

use crate::boundary::BoundaryWarning;
use crate::domain::{BranchPolicy, Changelog, ChangelogEntry, RejectedCommit, SectionKind};
use crate::release::{OrchestrationResult, ReleaseState};
use console::style;
use std::fmt::Write;

const SHORT_REVISION: usize = 7;

fn short(revision: &str) -> &str {
    revision.get(..SHORT_REVISION).unwrap_or(revision)
}

fn render_entry(out: &mut String, kind: SectionKind, entry: &ChangelogEntry) {
    let label = match (kind, entry.scope) {
        (SectionKind::Other, Some(scope)) => format!("{}({}): ", entry.commit_type, scope),
        (SectionKind::Other, None) => format!("{}: ", entry.commit_type),
        (_, Some(scope)) => format!("**{}:** ", scope),
        (_, None) => String::new(),
    };
    let _ = writeln!(
        out,
        "- {}{} ({})",
        label,
        entry.subject,
        short(&entry.revision_id)
    );
    if let Some(note) = &entry.note {
        for line in note.lines() {
            let _ = writeln!(out, "  > {}", line);
        }
    }
}

/// Render a changelog as Markdown
///
/// ```text
/// ## 1.3.0 (2024-05-01)
///
/// ### Features
///
/// - **api:** add bulk endpoint (9fceb02)
/// ```
pub fn render_markdown(changelog: &Changelog) -> String {
    let mut out = String::new();
    match changelog.date {
        Some(date) => {
            let _ = writeln!(out, "## {} ({})", changelog.version, date.format("%Y-%m-%d"));
        }
        None => {
            let _ = writeln!(out, "## {}", changelog.version);
        }
    }
    for section in &changelog.sections {
        let _ = write!(out, "\n### {}\n\n", section.title);
        for entry in &section.entries {
            render_entry(&mut out, section.kind, entry);
        }
    }
    out
}

/// One line per rejected commit, for logs and terminal output
pub fn render_rejections(rejected: &[RejectedCommit]) -> String {
    rejected
        .iter()
        .map(|r| format!("  - {}\n", r))
        .collect()
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠").yellow().bold(), warning);
}

/// Print every rejected commit; silent when there are none
pub fn display_rejections(rejected: &[RejectedCommit]) {
    if rejected.is_empty() {
        return;
    }
    eprintln!(
        "{} {} commit(s) do not follow the commit convention and were not counted:",
        style("⚠").yellow().bold(),
        rejected.len()
    );
    eprint!("{}", render_rejections(rejected));
}

/// One line per configured branch: name, kind and tag shape
pub fn render_branch_policy(policy: &BranchPolicy) -> String {
    match policy.channel() {
        Some(channel) => format!(
            "{} (pre-release '{}', tags {}X.Y.Z-{}.N)",
            policy.branch_name, channel, policy.version_prefix, channel
        ),
        None => format!(
            "{} (release, tags {}X.Y.Z)",
            policy.branch_name, policy.version_prefix
        ),
    }
}

/// Display list of configured branches.
pub fn display_available_branches(policies: &[BranchPolicy]) {
    println!("{}", style("Configured branches:").bold());
    for policy in policies {
        println!("  - {}", render_branch_policy(policy));
    }
}

/// Summarise the outcome of a run.
pub fn display_result(result: &OrchestrationResult, dry_run: bool) {
    let decision = &result.decision;
    match result.state {
        ReleaseState::NoRelease => display_status(&format!(
            "No releasable changes; version stays {}",
            decision.next_version
        )),
        ReleaseState::PendingTag => display_status(&format!(
            "{} bump -> {}{}",
            decision.bump_kind,
            style(result.tag_name.as_deref().unwrap_or_default()).green().bold(),
            if dry_run { " (dry run, no tag created)" } else { "" }
        )),
        ReleaseState::Tagged if result.tag_created => display_success(&format!(
            "Created tag {} ({} bump)",
            style(result.tag_name.as_deref().unwrap_or_default()).green().bold(),
            decision.bump_kind
        )),
        ReleaseState::Tagged => display_success(&format!(
            "Tag {} already exists at the target revision",
            result.tag_name.as_deref().unwrap_or_default()
        )),
        ReleaseState::Evaluating | ReleaseState::Conflict => {}
    }
}
