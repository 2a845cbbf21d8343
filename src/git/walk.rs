//! git::walk
//!
//! Seedable, ordered commit walk.
//!
//! A [`CommitWalk`] produces commits reachable from its start points and not
//! reachable from its hidden points, newest first (topological order, ties
//! broken by commit time). The walk remembers how it was seeded, so it can be
//! rewound and replayed with identical output.

use tracing::trace;

use super::interface::{from_git2_oid, to_git2_oid, Git, GitError};
use crate::core::types::{ObjectType, Oid};

/// An ordered walk over commit history.
///
/// Walk handles borrow the repository and are not thread-safe; create one
/// per request.
pub struct CommitWalk<'repo> {
    git: &'repo Git,
    walk: git2::Revwalk<'repo>,
    starts: Vec<Oid>,
    hidden: Vec<Oid>,
    first_parent: bool,
}

impl std::fmt::Debug for CommitWalk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitWalk")
            .field("starts", &self.starts)
            .field("hidden", &self.hidden)
            .field("first_parent", &self.first_parent)
            .finish()
    }
}

impl<'repo> CommitWalk<'repo> {
    /// Create an unseeded walk.
    pub fn new(git: &'repo Git) -> Result<Self, GitError> {
        let walk = git.repo.revwalk().map_err(|e| GitError::Internal {
            message: e.message().to_string(),
        })?;
        let mut this = Self {
            git,
            walk,
            starts: Vec::new(),
            hidden: Vec::new(),
            first_parent: false,
        };
        this.apply_options()?;
        Ok(this)
    }

    /// The repository this walk reads from.
    pub fn git(&self) -> &'repo Git {
        self.git
    }

    /// Mark a commit as a starting point.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotACommit`] if `oid` is not a commit
    pub fn push(&mut self, oid: &Oid) -> Result<(), GitError> {
        self.require_commit(oid)?;
        self.walk
            .push(to_git2_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        self.starts.push(oid.clone());
        Ok(())
    }

    /// Mark a commit and its ancestors as uninteresting.
    pub fn hide(&mut self, oid: &Oid) -> Result<(), GitError> {
        self.require_commit(oid)?;
        self.walk
            .hide(to_git2_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        self.hidden.push(oid.clone());
        Ok(())
    }

    /// Follow only the first parent of each commit.
    pub fn first_parent_only(&mut self) -> Result<(), GitError> {
        self.first_parent = true;
        self.walk
            .simplify_first_parent()
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })
    }

    /// Restart the walk from its recorded seeds.
    ///
    /// The replay yields exactly the same sequence as the first pass.
    pub fn rewind(&mut self) -> Result<(), GitError> {
        trace!(starts = self.starts.len(), "rewinding commit walk");
        self.walk.reset().map_err(|e| GitError::Internal {
            message: e.message().to_string(),
        })?;
        self.apply_options()?;
        if self.first_parent {
            self.walk
                .simplify_first_parent()
                .map_err(|e| GitError::Internal {
                    message: e.message().to_string(),
                })?;
        }
        for oid in &self.starts {
            self.walk
                .push(to_git2_oid(oid)?)
                .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        }
        for oid in &self.hidden {
            self.walk
                .hide(to_git2_oid(oid)?)
                .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        }
        Ok(())
    }

    fn apply_options(&mut self) -> Result<(), GitError> {
        self.walk
            .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })
    }

    fn require_commit(&self, oid: &Oid) -> Result<(), GitError> {
        match self.git.object_type(oid)? {
            ObjectType::Commit => Ok(()),
            kind => Err(GitError::NotACommit {
                oid: oid.to_string(),
                kind,
            }),
        }
    }
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<Oid, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.walk.next()?;
        Some(
            next.map_err(|e| GitError::from_git2(e, "revwalk"))
                .and_then(from_git2_oid),
        )
    }
}
