//! Pre-release identifiers for semantic versions
//!
//! A pre-release is a dot-separated list of identifiers ("beta.3", "rc.1.hotfix").
//! Precedence follows semver.org item 11: identifiers are compared field by
//! field, numeric fields numerically, alphanumeric fields in ASCII order, and a
//! numeric field always sorts before an alphanumeric one.

use crate::error::{ReleaseError, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One dot-separated field of a pre-release
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Identifier {
    /// Check that `s` is a legal alphanumeric identifier (`[0-9A-Za-z-]+`, not all digits)
    pub fn is_valid_label(s: &str) -> bool {
        !s.is_empty()
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !s.chars().all(|c| c.is_ascii_digit())
    }
}

impl FromStr for Identifier {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ReleaseError::version("Empty pre-release identifier"));
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            if s.len() > 1 && s.starts_with('0') {
                return Err(ReleaseError::version(format!(
                    "Numeric pre-release identifier has a leading zero: '{}'",
                    s
                )));
            }
            return s.parse::<u64>().map(Identifier::Numeric).map_err(|_| {
                ReleaseError::version(format!("Pre-release identifier out of range: '{}'", s))
            });
        }
        if Identifier::is_valid_label(s) {
            Ok(Identifier::AlphaNumeric(s.to_string()))
        } else {
            Err(ReleaseError::version(format!(
                "Invalid pre-release identifier: '{}'",
                s
            )))
        }
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => write!(f, "{}", s),
        }
    }
}

/// Pre-release part of a version, e.g. `beta.3`
///
/// Pre-release lineages produced by this crate always have the shape
/// `<channel>.<counter>`; arbitrary identifier lists are still accepted so
/// foreign tags can be parsed and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prerelease {
    identifiers: Vec<Identifier>,
}

impl Prerelease {
    /// Build the `<channel>.<counter>` pre-release used for branch lineages
    pub fn for_channel(channel: &str, counter: u64) -> Result<Self> {
        if !Identifier::is_valid_label(channel) {
            return Err(ReleaseError::version(format!(
                "Invalid pre-release channel: '{}'",
                channel
            )));
        }
        Ok(Prerelease {
            identifiers: vec![
                Identifier::AlphaNumeric(channel.to_string()),
                Identifier::Numeric(counter),
            ],
        })
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Counter of a `<channel>.<counter>` pre-release on the given channel
    ///
    /// Returns `None` for any other shape, so `beta.2.1` or `alpha.4` never
    /// feed the counter of the `beta` lineage.
    pub fn channel_counter(&self, channel: &str) -> Option<u64> {
        match self.identifiers.as_slice() {
            [Identifier::AlphaNumeric(label), Identifier::Numeric(n)] if label == channel => {
                Some(*n)
            }
            _ => None,
        }
    }
}

impl FromStr for Prerelease {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ReleaseError::version("Empty pre-release"));
        }
        let identifiers = s
            .split('.')
            .map(Identifier::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Prerelease { identifiers })
    }
}

impl Ord for Prerelease {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lexicographic over fields; a shorter list that is a prefix sorts first.
        self.identifiers.cmp(&other.identifiers)
    }
}

impl PartialOrd for Prerelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.identifiers.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

impl Serialize for Prerelease {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
