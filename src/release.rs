//! Release orchestration
//!
//! One run walks `Evaluating -> NoRelease` or
//! `Evaluating -> PendingTag -> Tagged | Conflict`. Everything before
//! `PendingTag` is pure computation plus read-only tag queries; the single
//! mutation is the `create_tag_if_absent` call. Runs share no state, so
//! concurrent or repeated runs converge through that call alone.

use crate::analyzer::{ExistingTags, ReleaseDecision, VersionCalculator};
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::conventional::CommitParser;
use crate::domain::{BranchPolicy, BumpKind, RawCommit, RejectedCommit, SemanticVersion, Tag, TagPattern};
use crate::error::{ReleaseError, Result};
use crate::git::TagRepository;
use serde::Serialize;
use std::fmt;

/// Inputs for one orchestration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub branch_name: String,
    pub previous_version: SemanticVersion,
    /// Oldest first
    pub commits_since_previous: Vec<RawCommit>,
    /// Tags the caller already knows about; merged with repository queries
    pub existing_tags: Vec<Tag>,
    /// Revision to tag; defaults to the newest commit in the batch
    pub target_revision: Option<String>,
}

impl ReleaseContext {
    fn target(&self) -> Option<String> {
        self.target_revision
            .clone()
            .or_else(|| self.commits_since_previous.last().map(|c| c.revision_id.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseState {
    Evaluating,
    NoRelease,
    PendingTag,
    Tagged,
    Conflict,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseState::Evaluating => "evaluating",
            ReleaseState::NoRelease => "no-release",
            ReleaseState::PendingTag => "pending-tag",
            ReleaseState::Tagged => "tagged",
            ReleaseState::Conflict => "conflict",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationResult {
    pub decision: ReleaseDecision,
    /// Every commit the parser quarantined; callers must report these
    pub rejected: Vec<RejectedCommit>,
    pub state: ReleaseState,
    /// False when the tag already existed at the target revision
    pub tag_created: bool,
    pub tag_name: Option<String>,
    pub target_revision: Option<String>,
}

/// Coordinates parsing, version calculation and tag creation
pub struct ReleaseOrchestrator<R> {
    repository: R,
    config: Config,
    parser: CommitParser,
    calculator: VersionCalculator,
}

impl<R: TagRepository> ReleaseOrchestrator<R> {
    /// Validates the configuration up front; a bad policy fails here
    pub fn new(repository: R, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(ReleaseOrchestrator {
            repository,
            calculator: VersionCalculator::new(config.versioning.clone()),
            parser: CommitParser::new()?,
            config,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the evaluating phase only, stopping at `NoRelease` or `PendingTag`
    pub async fn plan(&self, ctx: &ReleaseContext) -> Result<OrchestrationResult> {
        let policy = self.config.policy_for(&ctx.branch_name)?;
        transition(&ctx.branch_name, ReleaseState::Evaluating);

        let parsed = self.parser.parse(&ctx.commits_since_previous);
        let target_revision = ctx.target();

        let mut known = ctx.existing_tags.clone();
        if let Some(channel) = policy.channel() {
            if VersionCalculator::bump_kind(&parsed.records) != BumpKind::None {
                let pattern = TagPattern::new(policy.version_prefix.as_str()).glob_channel(channel);
                for tag in self.repository.find_tags_matching(&pattern).await? {
                    if !known.iter().any(|k| k.name == tag.name) {
                        known.push(tag);
                    }
                }
            }
        }

        let decision = self.calculator.next_version(
            &ctx.previous_version,
            &parsed.records,
            policy,
            ExistingTags {
                tags: &known,
                target_revision: target_revision.as_deref(),
            },
        )?;

        if !decision.should_release {
            transition(&ctx.branch_name, ReleaseState::NoRelease);
            return Ok(OrchestrationResult {
                decision,
                rejected: parsed.rejected,
                state: ReleaseState::NoRelease,
                tag_created: false,
                tag_name: None,
                target_revision,
            });
        }

        let Some(target_revision) = target_revision else {
            return Err(ReleaseError::tag(format!(
                "No revision to tag for {} on branch '{}'",
                decision.next_version, ctx.branch_name
            )));
        };
        let tag_name = tag_name_for(policy, &decision.next_version);
        transition(&ctx.branch_name, ReleaseState::PendingTag);

        Ok(OrchestrationResult {
            decision,
            rejected: parsed.rejected,
            state: ReleaseState::PendingTag,
            tag_created: false,
            tag_name: Some(tag_name),
            target_revision: Some(target_revision),
        })
    }

    /// Evaluate and, when a release is due, create its tag idempotently
    ///
    /// An existing tag at the same revision counts as success with
    /// `tag_created = false`. An existing tag at another revision ends the run
    /// with [`ReleaseError::TagConflict`]; it is never moved.
    pub async fn run(&self, ctx: &ReleaseContext) -> Result<OrchestrationResult> {
        let mut result = self.plan(ctx).await?;
        let (Some(tag_name), Some(target)) = (result.tag_name.clone(), result.target_revision.clone())
        else {
            return Ok(result);
        };
        if result.state != ReleaseState::PendingTag {
            return Ok(result);
        }

        let outcome = self
            .repository
            .create_tag_if_absent(&tag_name, &target)
            .await
            .map_err(|e| match e {
                ReleaseError::TagStateUnknown { .. } => e,
                other => ReleaseError::tag_state_unknown(tag_name.as_str(), other),
            })?;

        if !outcome.created {
            match outcome.existing_target {
                Some(existing) if existing == target => {
                    tracing::info!(tag = %tag_name, revision = %target, "tag already present");
                }
                Some(existing) => {
                    transition(&ctx.branch_name, ReleaseState::Conflict);
                    tracing::error!(
                        tag = %tag_name,
                        expected = %target,
                        actual = %existing,
                        "tag points at another revision"
                    );
                    return Err(ReleaseError::TagConflict {
                        tag: tag_name,
                        expected: target,
                        actual: existing,
                    });
                }
                None => {
                    return Err(ReleaseError::tag_state_unknown(
                        tag_name,
                        "repository reported an existing tag without its target",
                    ));
                }
            }
        } else {
            tracing::info!(tag = %tag_name, revision = %target, "created tag");
        }

        transition(&ctx.branch_name, ReleaseState::Tagged);
        result.state = ReleaseState::Tagged;
        result.tag_created = outcome.created;
        Ok(result)
    }
}

fn transition(branch: &str, state: ReleaseState) {
    tracing::debug!(branch, state = %state, "release state");
}

/// Tag name for `version` under the branch's prefix
pub fn tag_name_for(policy: &BranchPolicy, version: &SemanticVersion) -> String {
    TagPattern::new(policy.version_prefix.as_str()).format(version)
}

/// Latest version of a branch lineage, as found among existing tags
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousRelease {
    pub version: SemanticVersion,
    pub tag: Option<Tag>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Pick the previous version for `policy` from `tags`
///
/// Release branches only consider release tags. Pre-release branches also
/// consider their own channel, so a `beta` lineage continues from its last
/// beta. Tags with the prefix that do not parse are reported, not fatal.
pub fn discover_previous(
    tags: &[Tag],
    policy: &BranchPolicy,
    initial: &SemanticVersion,
) -> PreviousRelease {
    let pattern = TagPattern::new(policy.version_prefix.as_str());
    let mut warnings = Vec::new();
    let mut best: Option<(SemanticVersion, &Tag)> = None;

    for tag in tags.iter().filter(|t| pattern.has_prefix(&t.name)) {
        let Some(version) = pattern.parse_version(&tag.name) else {
            warnings.push(BoundaryWarning::UnparsableTag {
                tag: tag.name.clone(),
                reason: "not a semantic version after the prefix".to_string(),
            });
            continue;
        };
        let eligible = match (&version.prerelease, policy.channel()) {
            (None, _) => true,
            (Some(pre), Some(channel)) => pre.channel_counter(channel).is_some(),
            (Some(_), None) => false,
        };
        if eligible && best.as_ref().map_or(true, |(v, _)| version > *v) {
            best = Some((version, tag));
        }
    }

    match best {
        Some((version, tag)) => PreviousRelease {
            version,
            tag: Some(tag.clone()),
            warnings,
        },
        None => {
            warnings.push(BoundaryWarning::NoPreviousTag {
                prefix: policy.version_prefix.clone(),
                initial: initial.to_string(),
            });
            PreviousRelease {
                version: initial.clone(),
                tag: None,
                warnings,
            }
        }
    }
}
