#![allow(dead_code)]

use git2::{Repository, RepositoryInitOptions, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

/// 2024-06-01T00:00:00Z
const EPOCH: i64 = 1_717_200_000;

/// Throwaway git repository with `main` checked out
///
/// Commits carry no file changes; only messages and history matter here.
pub struct ScratchRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: i64,
}

impl ScratchRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        ScratchRepo {
            dir,
            repo,
            clock: EPOCH,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit on the checked-out branch, returning the revision id
    pub fn commit(&mut self, message: &str) -> String {
        self.clock += 60;
        let sig = Signature::new("Release Bot", "bot@example.com", &Time::new(self.clock, 0)).unwrap();
        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        oid.to_string()
    }

    pub fn tag(&self, name: &str, revision: &str) {
        let object = self
            .repo
            .find_object(git2::Oid::from_str(revision).unwrap(), None)
            .unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    /// Create `name` at HEAD and check it out
    pub fn switch_to_new_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
        self.repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    }

    pub fn tag_target(&self, name: &str) -> Option<String> {
        self.repo
            .find_reference(&format!("refs/tags/{}", name))
            .ok()
            .map(|r| r.peel_to_commit().unwrap().id().to_string())
    }

    /// Write a `release.toml` into the repository root and return its path
    pub fn write_config(&self, contents: &str) -> String {
        let path = self.dir.path().join("release.toml");
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }
}
