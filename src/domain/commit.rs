use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Commit entry as delivered by the history source, before parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub message: String,
    pub revision_id: String,
    pub timestamp: DateTime<Utc>,
}

impl RawCommit {
    pub fn new(
        message: impl Into<String>,
        revision_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        RawCommit {
            message: message.into(),
            revision_id: revision_id.into(),
            timestamp,
        }
    }
}

macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum!(
    /// Accepted commit types. Anything else is rejected as `unknown-type`.
    CommitType {
        Feat => "feat",
        Fix => "fix",
        Docs => "docs",
        Style => "style",
        Refactor => "refactor",
        Test => "test",
        Chore => "chore",
        Perf => "perf",
        Build => "build",
        Ci => "ci",
        Revert => "revert",
        Release => "release",
    }
);

closed_enum!(
    /// Accepted commit scopes. Anything else is rejected as `unknown-scope`.
    Scope {
        Api => "api",
        Ui => "ui",
        Core => "core",
        Auth => "auth",
        Db => "db",
        Config => "config",
        Deps => "deps",
        Ci => "ci",
        Docs => "docs",
        Test => "test",
        Security => "security",
        Performance => "performance",
        Workflow => "workflow",
        Action => "action",
        Template => "template",
    }
);

/// A `Token: value` or `Token #value` trailer line, with any continuation lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub token: String,
    pub value: String,
}

impl Footer {
    pub fn is_breaking_change(&self) -> bool {
        self.token == "BREAKING CHANGE" || self.token == "BREAKING-CHANGE"
    }
}

/// One commit that passed grammar validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub commit_type: CommitType,
    pub scope: Option<Scope>,
    pub subject: String,
    pub body: Option<String>,
    /// Footers in message order; repeated tokens are all kept.
    pub footers: Vec<Footer>,
    pub breaking: bool,
    pub revision_id: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitRecord {
    /// All values recorded for `token`, in message order
    pub fn footer_values<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.footers
            .iter()
            .filter(move |f| f.token == token)
            .map(|f| f.value.as_str())
    }

    /// Text of the first `BREAKING CHANGE` footer, if any
    pub fn breaking_note(&self) -> Option<&str> {
        self.footers
            .iter()
            .find(|f| f.is_breaking_change())
            .map(|f| f.value.as_str())
    }
}

/// Why a commit was quarantined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    InvalidHeader,
    HeaderTooLong,
    UnknownType,
    UnknownScope,
    EmptySubject,
    TrailingPeriod,
    NotLowerCase,
    MissingBlankLine,
    BodyLineTooLong,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::InvalidHeader => "invalid-header",
            RejectReason::HeaderTooLong => "header-too-long",
            RejectReason::UnknownType => "unknown-type",
            RejectReason::UnknownScope => "unknown-scope",
            RejectReason::EmptySubject => "empty-subject",
            RejectReason::TrailingPeriod => "trailing-period",
            RejectReason::NotLowerCase => "not-lower-case",
            RejectReason::MissingBlankLine => "missing-blank-line",
            RejectReason::BodyLineTooLong => "body-line-too-long",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A commit that failed validation, kept for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedCommit {
    /// The type token as written, when the header got far enough to have one
    pub commit_type: Option<String>,
    pub raw: String,
    pub revision_id: String,
    pub reason: RejectReason,
}

impl fmt::Display for RejectedCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.revision_id.get(..7).unwrap_or(&self.revision_id);
        let header = self.raw.lines().next().unwrap_or("");
        write!(f, "{} [{}] {}", short, self.reason, header)
    }
}
