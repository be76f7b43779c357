use crate::domain::prerelease::Identifier;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};

/// Release policy for one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPolicy {
    #[serde(rename = "name")]
    pub branch_name: String,

    /// Release branches produce clean `X.Y.Z` versions
    #[serde(rename = "release", default)]
    pub is_release: bool,

    /// Channel label appended on pre-release branches (`beta` -> `-beta.N`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerelease_tag: Option<String>,

    #[serde(rename = "prefix", default = "default_prefix")]
    pub version_prefix: String,
}

fn default_prefix() -> String {
    "v".to_string()
}

impl BranchPolicy {
    /// Policy for a release branch
    pub fn release(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        BranchPolicy {
            branch_name: name.into(),
            is_release: true,
            prerelease_tag: None,
            version_prefix: prefix.into(),
        }
    }

    /// Policy for a pre-release branch tagged with `channel`
    pub fn prerelease(
        name: impl Into<String>,
        channel: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        BranchPolicy {
            branch_name: name.into(),
            is_release: false,
            prerelease_tag: Some(channel.into()),
            version_prefix: prefix.into(),
        }
    }

    /// The channel label, present only on pre-release branches
    pub fn channel(&self) -> Option<&str> {
        if self.is_release {
            None
        } else {
            self.prerelease_tag.as_deref()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.branch_name.trim().is_empty() {
            return Err(ReleaseError::branch_policy("Branch name must not be empty"));
        }
        if self.version_prefix.chars().any(char::is_whitespace) {
            return Err(ReleaseError::branch_policy(format!(
                "Prefix '{}' for branch '{}' contains whitespace",
                self.version_prefix, self.branch_name
            )));
        }
        if self.is_release {
            if let Some(tag) = &self.prerelease_tag {
                return Err(ReleaseError::branch_policy(format!(
                    "Release branch '{}' must not set prerelease_tag '{}'",
                    self.branch_name, tag
                )));
            }
            return Ok(());
        }
        match self.prerelease_tag.as_deref() {
            None => Err(ReleaseError::branch_policy(format!(
                "Pre-release branch '{}' needs a prerelease_tag",
                self.branch_name
            ))),
            Some(tag) if !Identifier::is_valid_label(tag) => {
                Err(ReleaseError::branch_policy(format!(
                    "Pre-release tag '{}' for branch '{}' must be a single non-numeric identifier",
                    tag, self.branch_name
                )))
            }
            Some(_) => Ok(()),
        }
    }
}
