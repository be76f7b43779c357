//! Domain logic - pure value types independent of git operations

pub mod branch;
pub mod changelog;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::BranchPolicy;
pub use changelog::{Changelog, ChangelogEntry, ChangelogSection, SectionKind};
pub use commit::{CommitRecord, CommitType, Footer, RawCommit, RejectReason, RejectedCommit, Scope};
pub use prerelease::{Identifier, Prerelease};
pub use tag::{Tag, TagPattern};
pub use version::{BumpKind, SemanticVersion};
