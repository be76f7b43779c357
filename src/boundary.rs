use std::fmt;

/// Warnings raised while reading release history at the repository boundary.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No tag for this lineage yet; the configured initial version is used
    NoPreviousTag { prefix: String, initial: String },
    /// Tag has the lineage prefix but cannot be parsed as a semantic version
    UnparsableTag { tag: String, reason: String },
    /// No new commits since the latest tag
    NoNewCommits { latest_tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoPreviousTag { prefix, initial } => {
                write!(
                    f,
                    "No '{}*' tag found, starting from version {}",
                    prefix, initial
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::NoNewCommits { latest_tag } => {
                write!(f, "No new commits since tag '{}'", latest_tag)
            }
        }
    }
}
