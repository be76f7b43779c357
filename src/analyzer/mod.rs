//! Computations over parsed commits: version bumps and changelogs

pub mod changelog_builder;
pub mod version_calculator;

pub use changelog_builder::ChangelogBuilder;
pub use version_calculator::{ExistingTags, ReleaseDecision, VersionCalculator};
