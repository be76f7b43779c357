use crate::domain::{RawCommit, Tag};
use crate::error::{ReleaseError, Result};
use crate::git::{CreateOutcome, TagRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use git2::{ErrorCode, Oid, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};

/// A git repository on disk, accessed through libgit2
///
/// Only the path is kept. Each operation opens its own handle, and the async
/// trait methods do so on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct Git2Repository {
    path: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Git2Repository {
            path: repo.path().to_path_buf(),
        })
    }

    fn repo(&self) -> Result<Git2Repo> {
        Ok(Git2Repo::open(&self.path)?)
    }

    /// Short name of the checked-out branch
    pub fn current_branch(&self) -> Result<String> {
        let repo = self.repo()?;
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::config(
                "HEAD is detached; pass the branch name explicitly",
            ));
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::config("Branch name is not valid UTF-8"))
    }

    /// Commit at the tip of a local branch
    pub fn branch_head(&self, branch_name: &str) -> Result<String> {
        let repo = self.repo()?;
        let branch = repo
            .find_branch(branch_name, git2::BranchType::Local)
            .map_err(|e| {
                ReleaseError::config(format!("Cannot find branch '{}': {}", branch_name, e))
            })?;
        let commit = branch.get().peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Commits reachable from `branch_name` but not from `since_tag`, oldest first
    pub fn commits_since(&self, since_tag: Option<&str>, branch_name: &str) -> Result<Vec<RawCommit>> {
        let repo = self.repo()?;
        let head = Oid::from_str(&self.branch_head(branch_name)?)?;

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(head)?;
        if let Some(tag) = since_tag {
            let base = repo
                .find_reference(&format!("refs/tags/{}", tag))?
                .peel_to_commit()?;
            revwalk.hide(base.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            let timestamp = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)
                .unwrap_or_default();
            commits.push(RawCommit {
                message: commit.message().unwrap_or_default().to_string(),
                revision_id: commit.id().to_string(),
                timestamp,
            });
        }
        tracing::debug!(
            count = commits.len(),
            since = since_tag.unwrap_or("<root>"),
            branch = branch_name,
            "collected commits"
        );
        Ok(commits)
    }

    async fn blocking<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Git2Repo) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || f(Git2Repo::open(path)?))
            .await
            .map_err(|e| ReleaseError::repository(format!("{} was interrupted: {}", op, e)))?
    }
}

fn tag_target(repo: &Git2Repo, name: &str) -> Result<Option<String>> {
    match repo.find_reference(&format!("refs/tags/{}", name)) {
        Ok(reference) => {
            let commit = reference
                .peel_to_commit()
                .map_err(|e| ReleaseError::tag(format!("Cannot peel tag '{}': {}", name, e)))?;
            Ok(Some(commit.id().to_string()))
        }
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(ReleaseError::tag(format!("Cannot find tag '{}': {}", name, e))),
    }
}

#[async_trait]
impl TagRepository for Git2Repository {
    async fn find_tags_matching(&self, pattern: &str) -> Result<Vec<Tag>> {
        let pattern = pattern.to_string();
        self.blocking("tag query", move |repo| {
            let names = repo.tag_names(Some(pattern.as_str()))?;
            let mut tags = Vec::new();
            for name in names.iter().flatten() {
                if let Some(target) = tag_target(&repo, name)? {
                    tags.push(Tag::new(name, target));
                }
            }
            Ok(tags)
        })
        .await
        .map_err(|e| match e {
            ReleaseError::Repository(_) => e,
            other => ReleaseError::repository(other.to_string()),
        })
    }

    async fn create_tag_if_absent(
        &self,
        name: &str,
        target_revision: &str,
    ) -> Result<CreateOutcome> {
        let name = name.to_string();
        let target = target_revision.to_string();
        self.blocking("tag creation", move |repo| {
            if let Some(existing) = tag_target(&repo, &name)? {
                return Ok(CreateOutcome::existing(existing));
            }
            let object = repo
                .find_object(Oid::from_str(&target)?, None)
                .map_err(|e| ReleaseError::tag(format!("Cannot find revision {}: {}", target, e)))?;
            // force = false: libgit2 refuses to replace an existing ref, which
            // settles races with other writers.
            match repo.tag_lightweight(&name, &object, false) {
                Ok(_) => Ok(CreateOutcome::created()),
                Err(e) if e.code() == ErrorCode::Exists => match tag_target(&repo, &name)? {
                    Some(existing) => Ok(CreateOutcome::existing(existing)),
                    None => Err(ReleaseError::tag(format!(
                        "Tag '{}' reported as existing but cannot be read",
                        name
                    ))),
                },
                Err(e) => Err(e.into()),
            }
        })
        .await
    }
}
