//! Shared fixture for integration tests.
//!
//! Builds real repositories in a temp dir through git2, with fixed
//! signatures and timestamps so walk order is deterministic.

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use revgate::core::types::Oid;
use revgate::git::Git;
use revgate::visibility::{VisibilityCache, VisibilityChecker};

/// Base timestamp for fixture commits.
pub const EPOCH: i64 = 1_700_000_000;

/// Test fixture that creates a real git repository.
pub struct TestRepo {
    dir: TempDir,
    repo: git2::Repository,
}

impl TestRepo {
    /// Create an empty repository.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = git2::Repository::init(dir.path()).expect("failed to init repo");
        Self { dir, repo }
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a Git interface to this repository.
    pub fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    fn signature(time: i64) -> git2::Signature<'static> {
        git2::Signature::new("Test User", "test@example.com", &git2::Time::new(time, 0))
            .expect("signature")
    }

    /// Create a commit with the given parents, committed at `EPOCH + seq * 60`.
    ///
    /// Each commit gets a distinct tree so ids never collide.
    pub fn commit(&self, parents: &[&Oid], message: &str, seq: i64) -> Oid {
        let blob = self.repo.blob(message.as_bytes()).expect("blob");
        let mut builder = self.repo.treebuilder(None).expect("treebuilder");
        builder.insert("file.txt", blob, 0o100644).expect("insert");
        let tree_id = builder.write().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let parent_commits: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|p| self.repo.find_commit(raw(p)).expect("find parent"))
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();

        let sig = Self::signature(EPOCH + seq * 60);
        let id = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("commit");
        cooked(id)
    }

    /// Create a linear history of `n` commits, oldest first.
    pub fn linear(&self, n: usize) -> Vec<Oid> {
        let mut commits: Vec<Oid> = Vec::with_capacity(n);
        for i in 0..n {
            let parents: Vec<&Oid> = commits.last().into_iter().collect();
            let id = self.commit(&parents, &format!("c{}", i), i as i64);
            commits.push(id);
        }
        commits
    }

    /// Point a ref at an object, creating or moving it.
    pub fn set_ref(&self, name: &str, target: &Oid) {
        self.repo
            .reference(name, raw(target), true, "test")
            .expect("set ref");
    }

    /// Point `HEAD` at a branch.
    pub fn set_head(&self, branch: &str) {
        self.repo.set_head(branch).expect("set head");
    }

    /// Delete a ref.
    pub fn delete_ref(&self, name: &str) {
        self.repo
            .find_reference(name)
            .expect("find ref")
            .delete()
            .expect("delete ref");
    }

    /// Create an annotated tag object with a tagger, without a ref.
    pub fn annotated_tag(&self, name: &str, target: &Oid, tagger_time: i64) -> Oid {
        let object = self.repo.find_object(raw(target), None).expect("tag target");
        let sig = Self::signature(tagger_time);
        let id = self
            .repo
            .tag_annotation_create(name, &object, &sig, "tag message")
            .expect("tag");
        cooked(id)
    }

    /// Create an annotated tag object that has no tagger line.
    pub fn taggerless_tag(&self, name: &str, target: &Oid, kind: &str) -> Oid {
        let body = format!(
            "object {}\ntype {}\ntag {}\n\nno tagger\n",
            target, kind, name
        );
        let odb = self.repo.odb().expect("odb");
        let id = odb
            .write(git2::ObjectType::Tag, body.as_bytes())
            .expect("write tag");
        cooked(id)
    }

    /// The tree of a commit.
    pub fn tree_of(&self, commit: &Oid) -> Oid {
        let commit = self.repo.find_commit(raw(commit)).expect("commit");
        cooked(commit.tree_id())
    }

    /// The blob stored in a commit's tree.
    pub fn blob_of(&self, commit: &Oid) -> Oid {
        let commit = self.repo.find_commit(raw(commit)).expect("commit");
        let tree = commit.tree().expect("tree");
        let entry = tree.get_name("file.txt").expect("file.txt");
        cooked(entry.id())
    }
}

/// Visibility cache with the default exclusion set.
pub fn default_cache() -> VisibilityCache {
    VisibilityCache::new(
        VisibilityChecker::new(vec!["refs/changes/".to_string()]),
        1024,
    )
}

fn raw(oid: &Oid) -> git2::Oid {
    git2::Oid::from_str(oid.as_str()).expect("valid oid")
}

fn cooked(oid: git2::Oid) -> Oid {
    Oid::new(oid.to_string()).expect("valid oid")
}
