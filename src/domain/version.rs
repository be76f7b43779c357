use crate::domain::prerelease::Prerelease;
use crate::error::{ReleaseError, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Precedence is `major`, `minor`, `patch`, then pre-release (a pre-release
/// sorts before the release with the same core). Build metadata never changes
/// precedence; it only breaks ties so that `Ord` agrees with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<Prerelease>,
    pub build_metadata: Option<String>,
}

/// Magnitude of a version change, ordered from smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpKind::None => "none",
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        };
        write!(f, "{}", name)
    }
}

impl SemanticVersion {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: None,
            build_metadata: None,
        }
    }

    pub fn with_prerelease(mut self, prerelease: Prerelease) -> Self {
        self.prerelease = Some(prerelease);
        self
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// The `{major, minor, patch}` triple without pre-release or build metadata
    pub fn core(&self) -> SemanticVersion {
        SemanticVersion::new(self.major, self.minor, self.patch)
    }

    pub fn same_core(&self, other: &SemanticVersion) -> bool {
        self.major == other.major && self.minor == other.minor && self.patch == other.patch
    }

    /// Bump the core version, dropping pre-release and build metadata
    ///
    /// A pre-release previous version already stands for its upcoming core, so
    /// the core is kept when it already implies the bump: `2.1.0-beta.2` bumped
    /// by minor or patch stays `2.1.0`, bumped by major becomes `3.0.0`.
    /// Fails when the bumped component would exceed `u64::MAX`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let (major, minor, patch) = (self.major, self.minor, self.patch);
        if self.is_prerelease() {
            let implied = match kind {
                BumpKind::Major => minor == 0 && patch == 0,
                BumpKind::Minor => patch == 0,
                BumpKind::Patch | BumpKind::None => true,
            };
            if implied {
                return Ok(self.core());
            }
        }
        let overflow = || ReleaseError::version(format!("Cannot apply {} bump to {}", kind, self));
        let next = |n: u64| n.checked_add(1).ok_or_else(overflow);
        Ok(match kind {
            BumpKind::Major => SemanticVersion::new(next(major)?, 0, 0),
            BumpKind::Minor => SemanticVersion::new(major, next(minor)?, 0),
            BumpKind::Patch => SemanticVersion::new(major, minor, next(patch)?),
            BumpKind::None => self.clone(),
        })
    }
}

impl FromStr for SemanticVersion {
    type Err = ReleaseError;

    /// Parse `X.Y.Z[-pre][+build]`; the `semver` crate enforces the grammar.
    fn from_str(s: &str) -> Result<Self> {
        let parsed = semver::Version::parse(s)
            .map_err(|e| ReleaseError::version(format!("Invalid version '{}': {}", s, e)))?;

        let prerelease = if parsed.pre.is_empty() {
            None
        } else {
            Some(parsed.pre.as_str().parse::<Prerelease>()?)
        };
        let build_metadata = if parsed.build.is_empty() {
            None
        } else {
            Some(parsed.build.as_str().to_string())
        };

        Ok(SemanticVersion {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            prerelease,
            build_metadata,
        })
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| self.build_metadata.cmp(&other.build_metadata))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build_metadata {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
