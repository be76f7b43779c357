use thiserror::Error;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid branch policy: {0}")]
    InvalidBranchPolicy(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    /// The tag already exists and points at another revision.
    #[error("Tag conflict: '{tag}' already points at {actual}, expected {expected}")]
    TagConflict {
        tag: String,
        expected: String,
        actual: String,
    },

    /// A read against the tag repository failed before any tag was requested.
    #[error("Tag repository query failed: {0}")]
    Repository(String),

    /// The create call itself failed; the tag may or may not exist now.
    #[error("Tag creation for '{tag}' did not complete, tag state unknown: {reason}")]
    TagStateUnknown { tag: String, reason: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// What a failed run tells the caller about the release tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    /// The run stopped before (or without) creating the tag.
    NotTagged,
    /// The tag-creation call failed midway; rerun with the same inputs to settle it.
    Unknown,
}

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a branch policy error with context
    pub fn branch_policy(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidBranchPolicy(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    /// Create a repository query error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        ReleaseError::Repository(msg.into())
    }

    /// Wrap a failed create call for `tag`
    pub fn tag_state_unknown(tag: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ReleaseError::TagStateUnknown {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }

    pub fn tag_state(&self) -> TagState {
        match self {
            ReleaseError::TagStateUnknown { .. } => TagState::Unknown,
            _ => TagState::NotTagged,
        }
    }

    /// Whether rerunning with identical inputs may succeed.
    ///
    /// Always safe to attempt because tag creation is idempotent; this only
    /// says whether the failure looks transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReleaseError::Repository(_)
                | ReleaseError::TagStateUnknown { .. }
                | ReleaseError::Git(_)
                | ReleaseError::Io(_)
        )
    }
}
