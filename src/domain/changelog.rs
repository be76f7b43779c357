use crate::domain::commit::{CommitType, Scope};
use crate::domain::version::SemanticVersion;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Changelog sections in their fixed rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    BreakingChanges,
    Features,
    Fixes,
    Performance,
    Other,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 5] = [
        SectionKind::BreakingChanges,
        SectionKind::Features,
        SectionKind::Fixes,
        SectionKind::Performance,
        SectionKind::Other,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::BreakingChanges => "Breaking Changes",
            SectionKind::Features => "Features",
            SectionKind::Fixes => "Fixes",
            SectionKind::Performance => "Performance Improvements",
            SectionKind::Other => "Other Changes",
        }
    }

    /// Section a commit type belongs to, ignoring breaking-change duplication
    pub fn primary_for(commit_type: CommitType) -> SectionKind {
        match commit_type {
            CommitType::Feat => SectionKind::Features,
            CommitType::Fix => SectionKind::Fixes,
            CommitType::Perf => SectionKind::Performance,
            CommitType::Docs
            | CommitType::Style
            | CommitType::Refactor
            | CommitType::Test
            | CommitType::Chore
            | CommitType::Build
            | CommitType::Ci
            | CommitType::Revert
            | CommitType::Release => SectionKind::Other,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub commit_type: CommitType,
    pub scope: Option<Scope>,
    pub subject: String,
    pub revision_id: String,
    /// `BREAKING CHANGE` footer text, set on entries of the breaking section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogSection {
    pub kind: SectionKind,
    pub title: &'static str,
    pub entries: Vec<ChangelogEntry>,
}

/// Structured changelog for one version; sections are never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Changelog {
    pub version: SemanticVersion,
    /// Date of the newest commit in the batch
    pub date: Option<NaiveDate>,
    pub sections: Vec<ChangelogSection>,
}

impl Changelog {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, kind: SectionKind) -> Option<&ChangelogSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}
