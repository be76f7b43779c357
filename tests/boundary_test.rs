use git_release::boundary::BoundaryWarning;
use git_release::domain::{BranchPolicy, SemanticVersion, Tag};
use git_release::release::discover_previous;
use git_release::ui;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_no_new_commits_display() {
    let warning = BoundaryWarning::NoNewCommits {
        latest_tag: "v1.0.0".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("No new commits"),
        "Message should contain 'No new commits', got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("v1.0.0"),
        "Message should contain tag 'v1.0.0', got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_unparsable_tag_display() {
    let warning = BoundaryWarning::UnparsableTag {
        tag: "v1.2".to_string(),
        reason: "Invalid format".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(display_msg.contains("Cannot parse tag"), "got: {}", display_msg);
    assert!(display_msg.contains("v1.2"), "got: {}", display_msg);
    assert!(display_msg.contains("Invalid format"), "got: {}", display_msg);
}

#[test]
fn test_boundary_warning_no_previous_tag_display() {
    let warning = BoundaryWarning::NoPreviousTag {
        prefix: "release-".to_string(),
        initial: "1.0.0".to_string(),
    };
    assert_eq!(
        warning.to_string(),
        "No 'release-*' tag found, starting from version 1.0.0"
    );
}

// ============================================================================
// Warnings raised while discovering the previous release
// ============================================================================

#[test]
fn test_discovery_reports_every_unparsable_tag() {
    let tags = vec![
        Tag::new("v1.0.0", "a"),
        Tag::new("v1.2", "b"),
        Tag::new("v01.0.0", "c"),
        Tag::new("vlatest", "d"),
    ];
    let previous = discover_previous(
        &tags,
        &BranchPolicy::release("main", "v"),
        &SemanticVersion::new(0, 0, 0),
    );
    assert_eq!(previous.version, SemanticVersion::new(1, 0, 0));

    let bad: Vec<&str> = previous
        .warnings
        .iter()
        .filter_map(|w| match w {
            BoundaryWarning::UnparsableTag { tag, .. } => Some(tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(bad, vec!["v1.2", "v01.0.0", "vlatest"]);
}

#[test]
fn test_discovery_ignores_other_channels() {
    let tags = vec![Tag::new("v1.1.0-rc.3", "a"), Tag::new("v1.0.0", "b")];
    let previous = discover_previous(
        &tags,
        &BranchPolicy::prerelease("develop", "beta", "v"),
        &SemanticVersion::new(0, 0, 0),
    );
    assert_eq!(previous.version, SemanticVersion::new(1, 0, 0));
    assert!(previous.warnings.is_empty());
}

// ============================================================================
// Display function smoke test
// ============================================================================

#[test]
fn test_display_boundary_warning_does_not_panic() {
    ui::display_boundary_warning(&BoundaryWarning::NoNewCommits {
        latest_tag: "v1.0.0".to_string(),
    });
}
