//! Tag storage abstraction layer
//!
//! The release engine never touches git directly; it talks to a
//! [TagRepository], the only place durable release state lives. Two
//! implementations ship with the crate:
//!
//! - [repository::Git2Repository]: a real repository through the `git2` crate
//! - [mock::InMemoryTagRepository]: an in-process store for tests
//!
//! # Usage
//!
//! ```rust
//! # use git_release::git::TagRepository;
//! # async fn example<R: TagRepository>(repo: &R) -> git_release::Result<()> {
//! let outcome = repo.create_tag_if_absent("v1.2.0", "9fceb02").await?;
//! if !outcome.created {
//!     println!("tag already existed at {:?}", outcome.existing_target);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::InMemoryTagRepository;
pub use repository::Git2Repository;

use crate::domain::Tag;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Result of an idempotent tag creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    /// True when this call created the tag
    pub created: bool,
    /// Target of the tag that was already there, when `created` is false
    pub existing_target: Option<String>,
}

impl CreateOutcome {
    pub fn created() -> Self {
        CreateOutcome {
            created: true,
            existing_target: None,
        }
    }

    pub fn existing(target: impl Into<String>) -> Self {
        CreateOutcome {
            created: false,
            existing_target: Some(target.into()),
        }
    }
}

/// Storage boundary for release tags
///
/// ## Thread Safety
///
/// Implementors must be `Send + Sync`; concurrent release runs may share one
/// repository. No locking is expected: correctness under races comes from
/// `create_tag_if_absent` being atomic.
///
/// ## Cancellation
///
/// Both operations may be slow or network-bound. Dropping the returned future
/// cancels the call; a cancelled create must be retried with the same inputs.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags whose names match a glob `pattern` (e.g. `v*-beta.*`), with the
    /// commit each one points at
    async fn find_tags_matching(&self, pattern: &str) -> Result<Vec<Tag>>;

    /// Create `name` at `target_revision` unless a tag of that name exists
    ///
    /// Must be atomic: of several concurrent callers exactly one sees
    /// `created = true`; the others get the existing target back.
    async fn create_tag_if_absent(&self, name: &str, target_revision: &str)
        -> Result<CreateOutcome>;
}

#[async_trait]
impl<R: TagRepository + ?Sized> TagRepository for Arc<R> {
    async fn find_tags_matching(&self, pattern: &str) -> Result<Vec<Tag>> {
        (**self).find_tags_matching(pattern).await
    }

    async fn create_tag_if_absent(
        &self,
        name: &str,
        target_revision: &str,
    ) -> Result<CreateOutcome> {
        (**self).create_tag_if_absent(name, target_revision).await
    }
}
