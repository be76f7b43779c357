use crate::analyzer::ChangelogBuilder;
use crate::config::VersioningConfig;
use crate::domain::{
    BranchPolicy, BumpKind, Changelog, CommitRecord, CommitType, Prerelease, SemanticVersion,
    Tag, TagPattern,
};
use crate::error::{ReleaseError, Result};
use serde::Serialize;

/// Outcome of evaluating one batch of commits; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDecision {
    pub should_release: bool,
    /// Equals the previous version when `should_release` is false
    pub next_version: SemanticVersion,
    pub bump_kind: BumpKind,
    pub changelog: Changelog,
}

/// Prerelease tags already present, plus the revision about to be tagged
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistingTags<'a> {
    pub tags: &'a [Tag],
    pub target_revision: Option<&'a str>,
}

/// Computes the next version for a batch of commits
pub struct VersionCalculator {
    config: VersioningConfig,
}

impl VersionCalculator {
    pub fn new(config: VersioningConfig) -> Self {
        VersionCalculator { config }
    }

    /// Strongest bump any record in the batch asks for
    pub fn bump_kind(records: &[CommitRecord]) -> BumpKind {
        records
            .iter()
            .map(|record| {
                if record.breaking {
                    BumpKind::Major
                } else {
                    match record.commit_type {
                        CommitType::Feat => BumpKind::Minor,
                        CommitType::Fix | CommitType::Perf | CommitType::Refactor => {
                            BumpKind::Patch
                        }
                        _ => BumpKind::None,
                    }
                }
            })
            .max()
            .unwrap_or(BumpKind::None)
    }

    /// Apply the pre-1.0 policy: breaking changes on `0.x.y` bump minor
    pub fn effective_bump(&self, previous: &SemanticVersion, kind: BumpKind) -> BumpKind {
        if kind == BumpKind::Major
            && previous.major == 0
            && self.config.pre_1_0_breaking_bumps_minor
        {
            BumpKind::Minor
        } else {
            kind
        }
    }

    /// Compute the release decision for `records` on `policy`'s branch
    ///
    /// Pre-release counters come from `existing` only, so the result depends on
    /// nothing but the arguments. A tag of the same lineage that already points
    /// at the target revision is reused, which keeps reruns on one tag.
    pub fn next_version(
        &self,
        previous: &SemanticVersion,
        records: &[CommitRecord],
        policy: &BranchPolicy,
        existing: ExistingTags<'_>,
    ) -> Result<ReleaseDecision> {
        let bump_kind = self.effective_bump(previous, Self::bump_kind(records));

        if bump_kind == BumpKind::None {
            return Ok(ReleaseDecision {
                should_release: false,
                next_version: previous.clone(),
                bump_kind,
                changelog: ChangelogBuilder::build(records, previous),
            });
        }

        let core = previous.bump(bump_kind)?;
        let next_version = if policy.is_release {
            core
        } else {
            let channel = policy.channel().ok_or_else(|| {
                ReleaseError::branch_policy(format!(
                    "Pre-release branch '{}' has no prerelease_tag",
                    policy.branch_name
                ))
            })?;
            let counter = prerelease_counter(
                &core,
                channel,
                previous,
                &TagPattern::new(policy.version_prefix.as_str()),
                existing,
            )?;
            core.with_prerelease(Prerelease::for_channel(channel, counter)?)
        };

        tracing::debug!(
            previous = %previous,
            next = %next_version,
            bump = %bump_kind,
            branch = %policy.branch_name,
            "computed next version"
        );

        Ok(ReleaseDecision {
            should_release: true,
            changelog: ChangelogBuilder::build(records, &next_version),
            next_version,
            bump_kind,
        })
    }
}

/// Counter for `core-channel.N`: reuse the one already on the target revision,
/// otherwise one past the highest seen in tags or in `previous`.
fn prerelease_counter(
    core: &SemanticVersion,
    channel: &str,
    previous: &SemanticVersion,
    pattern: &TagPattern,
    existing: ExistingTags<'_>,
) -> Result<u64> {
    let lineage = |version: &SemanticVersion| -> Option<u64> {
        if !version.same_core(core) {
            return None;
        }
        version.prerelease.as_ref()?.channel_counter(channel)
    };

    let mut highest = lineage(previous).unwrap_or(0);
    let mut on_target: Option<u64> = None;

    for tag in existing.tags {
        let Some(counter) = pattern.parse_version(&tag.name).as_ref().and_then(lineage) else {
            continue;
        };
        highest = highest.max(counter);
        if existing.target_revision == Some(tag.target.as_str()) {
            on_target = Some(on_target.map_or(counter, |c| c.max(counter)));
        }
    }

    match on_target {
        Some(counter) => Ok(counter),
        None => highest.checked_add(1).ok_or_else(|| {
            ReleaseError::version(format!(
                "Pre-release counter for {}-{} is exhausted",
                core, channel
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventional::CommitParser;
    use crate::domain::RawCommit;
    use chrono::Utc;

    fn records(messages: &[&str]) -> Vec<CommitRecord> {
        let raw: Vec<RawCommit> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| RawCommit::new(*m, format!("rev{}", i), Utc::now()))
            .collect();
        let outcome = CommitParser::new().unwrap().parse(&raw);
        assert!(outcome.rejected.is_empty(), "{:?}", outcome.rejected);
        outcome.records
    }

    fn calculator() -> VersionCalculator {
        VersionCalculator::new(VersioningConfig::default())
    }

    fn v(s: &str) -> SemanticVersion {
        s.parse().unwrap()
    }

    fn main_branch() -> BranchPolicy {
        BranchPolicy::release("main", "v")
    }

    fn develop() -> BranchPolicy {
        BranchPolicy::prerelease("develop", "beta", "v")
    }

    #[test]
    fn test_bump_kind_precedence() {
        assert_eq!(
            VersionCalculator::bump_kind(&records(&["feat: a", "fix(api)!: b"])),
            BumpKind::Major
        );
        assert_eq!(
            VersionCalculator::bump_kind(&records(&["fix: a", "feat: b"])),
            BumpKind::Minor
        );
        assert_eq!(
            VersionCalculator::bump_kind(&records(&["perf: a", "refactor: b", "docs: c"])),
            BumpKind::Patch
        );
        assert_eq!(
            VersionCalculator::bump_kind(&records(&[
                "docs: a", "style: b", "test: c", "chore: d", "build: e", "ci: f", "revert: g"
            ])),
            BumpKind::None
        );
        assert_eq!(VersionCalculator::bump_kind(&[]), BumpKind::None);
    }

    #[test]
    fn test_breaking_after_features_still_major() {
        let recs = records(&["feat: one", "feat: two", "fix(core)!: three"]);
        assert_eq!(VersionCalculator::bump_kind(&recs), BumpKind::Major);
    }

    #[test]
    fn test_adding_feature_never_lowers_bump() {
        let batches: Vec<Vec<&str>> = vec![
            vec!["fix: a"],
            vec!["fix: a", "docs: b"],
            vec!["fix: a", "feat(api)!: c"],
            vec!["fix: a", "perf: d"],
        ];
        for batch in batches {
            let before = VersionCalculator::bump_kind(&records(&batch));
            let mut extended = batch.clone();
            extended.push("feat: extra");
            let after = VersionCalculator::bump_kind(&records(&extended));
            assert!(after >= before, "{:?}: {:?} -> {:?}", batch, before, after);
            assert!(after >= BumpKind::Minor);
        }
    }

    #[test]
    fn test_release_branch_scenario() {
        let recs = records(&["fix(core): correct cache key", "feat(api): add bulk endpoint"]);
        let decision = calculator()
            .next_version(&v("1.2.3"), &recs, &main_branch(), ExistingTags::default())
            .unwrap();
        assert!(decision.should_release);
        assert_eq!(decision.next_version, v("1.3.0"));
        assert_eq!(decision.bump_kind, BumpKind::Minor);
    }

    #[test]
    fn test_breaking_major_bump() {
        let recs = records(&["feat(core)!: remove legacy handler"]);
        let decision = calculator()
            .next_version(&v("2.0.0"), &recs, &main_branch(), ExistingTags::default())
            .unwrap();
        assert_eq!(decision.next_version, v("3.0.0"));
        assert_eq!(decision.bump_kind, BumpKind::Major);
    }

    #[test]
    fn test_pre_1_0_breaking_bumps_minor() {
        let recs = records(&["feat(api)!: change response shape", "fix: typo"]);
        let decision = calculator()
            .next_version(&v("0.3.1"), &recs, &main_branch(), ExistingTags::default())
            .unwrap();
        assert_eq!(decision.next_version.major, 0);
        assert_eq!(decision.next_version.minor, 4);
        assert_eq!(decision.next_version, v("0.4.0"));
        assert_eq!(decision.bump_kind, BumpKind::Minor);
    }

    #[test]
    fn test_pre_1_0_policy_can_be_disabled() {
        let calc = VersionCalculator::new(VersioningConfig {
            pre_1_0_breaking_bumps_minor: false,
            ..VersioningConfig::default()
        });
        let recs = records(&["feat(api)!: change response shape"]);
        let decision = calc
            .next_version(&v("0.3.1"), &recs, &main_branch(), ExistingTags::default())
            .unwrap();
        assert_eq!(decision.next_version, v("1.0.0"));
        assert_eq!(decision.bump_kind, BumpKind::Major);
    }

    #[test]
    fn test_no_release_keeps_previous() {
        let recs = records(&["docs: update readme", "chore(deps): bump regex"]);
        let decision = calculator()
            .next_version(&v("1.4.2"), &recs, &main_branch(), ExistingTags::default())
            .unwrap();
        assert!(!decision.should_release);
        assert_eq!(decision.bump_kind, BumpKind::None);
        assert_eq!(decision.next_version, v("1.4.2"));
        assert_eq!(decision.changelog.entry_count(), 2);
    }

    #[test]
    fn test_prerelease_counter_continues_lineage() {
        let tags = vec![
            Tag::new("v2.1.0-beta.1", "aaa"),
            Tag::new("v2.1.0-beta.2", "bbb"),
            Tag::new("v2.1.0-alpha.7", "ccc"),
            Tag::new("v2.0.0-beta.9", "ddd"),
        ];
        let recs = records(&["feat(ui): add dark mode"]);
        let decision = calculator()
            .next_version(
                &v("2.0.0"),
                &recs,
                &develop(),
                ExistingTags {
                    tags: &tags,
                    target_revision: Some("eee"),
                },
            )
            .unwrap();
        assert_eq!(decision.next_version, v("2.1.0-beta.3"));
        assert_eq!(decision.bump_kind, BumpKind::Minor);
    }

    #[test]
    fn test_exhausted_prerelease_counter_is_an_error() {
        let tags = vec![Tag::new("v2.1.0-beta.18446744073709551615", "aaa")];
        let recs = records(&["feat(ui): add dark mode"]);
        let err = calculator()
            .next_version(
                &v("2.0.0"),
                &recs,
                &develop(),
                ExistingTags {
                    tags: &tags,
                    target_revision: Some("bbb"),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Version(_)));
    }

    #[test]
    fn test_exhausted_counter_on_target_is_reused() {
        let tags = vec![Tag::new("v2.1.0-beta.18446744073709551615", "aaa")];
        let recs = records(&["feat(ui): add dark mode"]);
        let decision = calculator()
            .next_version(
                &v("2.0.0"),
                &recs,
                &develop(),
                ExistingTags {
                    tags: &tags,
                    target_revision: Some("aaa"),
                },
            )
            .unwrap();
        assert_eq!(decision.next_version, v("2.1.0-beta.18446744073709551615"));
    }

    #[test]
    fn test_major_bump_at_limit_is_an_error() {
        let recs = records(&["feat!: drop v1 api"]);
        let err = calculator()
            .next_version(
                &v("18446744073709551615.0.0"),
                &recs,
                &main_branch(),
                ExistingTags::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Version(_)));
    }

    #[test]
    fn test_prerelease_counter_starts_at_one() {
        let recs = records(&["fix: handle nulls"]);
        let decision = calculator()
            .next_version(&v("1.0.0"), &recs, &develop(), ExistingTags::default())
            .unwrap();
        assert_eq!(decision.next_version, v("1.0.1-beta.1"));
    }

    #[test]
    fn test_prerelease_counter_reuses_tag_on_target() {
        let tags = vec![
            Tag::new("v2.1.0-beta.1", "aaa"),
            Tag::new("v2.1.0-beta.2", "bbb"),
            Tag::new("v2.1.0-beta.3", "ccc"),
        ];
        let recs = records(&["feat(ui): add dark mode"]);
        let decision = calculator()
            .next_version(
                &v("2.0.0"),
                &recs,
                &develop(),
                ExistingTags {
                    tags: &tags,
                    target_revision: Some("ccc"),
                },
            )
            .unwrap();
        assert_eq!(decision.next_version, v("2.1.0-beta.3"));
    }

    #[test]
    fn test_prerelease_previous_counts_toward_lineage() {
        let recs = records(&["fix: handle nulls"]);
        let decision = calculator()
            .next_version(&v("2.1.0-beta.4"), &recs, &develop(), ExistingTags::default())
            .unwrap();
        assert_eq!(decision.next_version, v("2.1.0-beta.5"));
    }

    #[test]
    fn test_release_branch_promotes_prerelease() {
        let recs = records(&["fix: handle nulls"]);
        let decision = calculator()
            .next_version(&v("2.1.0-beta.4"), &recs, &main_branch(), ExistingTags::default())
            .unwrap();
        assert_eq!(decision.next_version, v("2.1.0"));
    }

    #[test]
    fn test_deterministic() {
        let recs = records(&["feat(api): add endpoint", "fix(db): pool size"]);
        let tags = vec![Tag::new("v1.3.0-beta.1", "aaa")];
        let existing = ExistingTags {
            tags: &tags,
            target_revision: Some("bbb"),
        };
        let first = calculator()
            .next_version(&v("1.2.0"), &recs, &develop(), existing)
            .unwrap();
        let second = calculator()
            .next_version(&v("1.2.0"), &recs, &develop(), existing)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.next_version, v("1.3.0-beta.2"));
    }
}
