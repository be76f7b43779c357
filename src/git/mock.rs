use crate::domain::Tag;
use crate::error::{ReleaseError, Result};
use crate::git::{CreateOutcome, TagRepository};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory tag store for testing without actual git operations
///
/// Creation is atomic under the internal lock, so it honours the same
/// contract as a real repository when shared between concurrent runs.
#[derive(Debug, Default)]
pub struct InMemoryTagRepository {
    tags: Mutex<BTreeMap<String, String>>,
    fail_queries: AtomicBool,
    fail_creates: AtomicBool,
    create_calls: AtomicUsize,
}

impl InMemoryTagRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository preloaded with tags
    pub fn with_tags<I, N, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        let repo = Self::new();
        for (name, target) in tags {
            repo.insert(name, target);
        }
        repo
    }

    /// Add or move a tag, bypassing the create-if-absent rules
    pub fn insert(&self, name: impl Into<String>, target: impl Into<String>) {
        self.lock().insert(name.into(), target.into());
    }

    pub fn target_of(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    /// Every tag, sorted by name
    pub fn tags(&self) -> Vec<Tag> {
        self.lock()
            .iter()
            .map(|(name, target)| Tag::new(name.clone(), target.clone()))
            .collect()
    }

    /// Make subsequent `find_tags_matching` calls fail
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `create_tag_if_absent` calls fail without creating anything
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Number of `create_tag_if_absent` calls received
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still consistent: every mutation is a single insert.
        self.tags.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn find_tags_matching(&self, pattern: &str) -> Result<Vec<Tag>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ReleaseError::repository("simulated query failure"));
        }
        let glob = glob::Pattern::new(pattern)
            .map_err(|e| ReleaseError::tag(format!("Invalid tag pattern '{}': {}", pattern, e)))?;
        Ok(self
            .lock()
            .iter()
            .filter(|(name, _)| glob.matches(name))
            .map(|(name, target)| Tag::new(name.clone(), target.clone()))
            .collect())
    }

    async fn create_tag_if_absent(
        &self,
        name: &str,
        target_revision: &str,
    ) -> Result<CreateOutcome> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(ReleaseError::repository("simulated create failure"));
        }
        let mut tags = self.lock();
        if let Some(existing) = tags.get(name) {
            return Ok(CreateOutcome::existing(existing.clone()));
        }
        tags.insert(name.to_string(), target_revision.to_string());
        Ok(CreateOutcome::created())
    }
}
