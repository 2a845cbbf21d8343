//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to the object store. All
//! ref lookups, object parsing and ancestry walks flow through this
//! interface, which provides structured results and normalizes errors into
//! typed failure categories.
//!
//! # Architecture
//!
//! The `Git` struct is the only way to interact with a Git repository.
//! No other module should import `git2` directly. This ensures:
//!
//! - Consistent error handling across all Git operations
//! - Strong type guarantees at the boundary
//! - Storage faults stay distinguishable from "not found"
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::ObjectNotFound`]: Requested object is missing from the store
//! - [`GitError::NotACommit`]: A commit was required but another kind was found
//!
//! Lookups that are expected to miss (user-supplied names and hashes)
//! return `Ok(None)` instead of erroring.
//!
//! # Example
//!
//! ```ignore
//! use revgate::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/srv/git/project.git"))?;
//! if let Some(entry) = git.find_ref("refs/heads/main")? {
//!     println!("main is at {}", entry.target.short(7));
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::types::{ObjectType, Oid, RefName, TypeError};

/// Errors from Git operations.
///
/// Every variant is a storage-level fault or a caller bug. User input that
/// simply does not resolve is reported as `Ok(None)` by the lookup methods,
/// never through this type.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// A commit was required but the object has another type.
    #[error("object {oid} is a {kind}, not a commit")]
    NotACommit {
        /// The offending object
        oid: String,
        /// Its actual type
        kind: ObjectType,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    pub(crate) fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) => GitError::InvalidRefName { message: msg },
        }
    }
}

/// Convert a strong OID into a git2 OID.
pub(super) fn to_git2_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

/// Convert a git2 OID into a strong OID.
pub(super) fn from_git2_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(|e| e.into())
}

fn object_type_of(kind: Option<git2::ObjectType>, oid: &str) -> Result<ObjectType, GitError> {
    match kind {
        Some(git2::ObjectType::Commit) => Ok(ObjectType::Commit),
        Some(git2::ObjectType::Tree) => Ok(ObjectType::Tree),
        Some(git2::ObjectType::Blob) => Ok(ObjectType::Blob),
        Some(git2::ObjectType::Tag) => Ok(ObjectType::Tag),
        _ => Err(GitError::Internal {
            message: format!("object {} has an unknown type", oid),
        }),
    }
}

/// A ref with its name and target OID.
///
/// Used when enumerating refs in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// The full ref name
    pub name: RefName,
    /// The object the ref points to directly
    pub target: Oid,
    /// The fully dereferenced non-tag object, when `target` is an annotated tag
    pub peeled: Option<Oid>,
}

impl RefEntry {
    /// The object this ref ultimately designates (peeled when possible).
    pub fn peeled_or_target(&self) -> &Oid {
        self.peeled.as_ref().unwrap_or(&self.target)
    }
}

/// Parsed header view of any object.
///
/// Only the fields meaningful for `kind` are populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// The object id
    pub oid: Oid,
    /// The object type
    pub kind: ObjectType,
    /// Direct target of an annotated tag
    pub target: Option<Oid>,
    /// Tagger timestamp in seconds, for annotated tags that carry one
    pub tagger_time: Option<i64>,
    /// Committer timestamp in seconds, for commits
    pub commit_time: Option<i64>,
    /// Parents of a commit, in order
    pub parents: Vec<Oid>,
}

/// Information about a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Parent OIDs, first parent first
    pub parents: Vec<Oid>,
    /// First line of the commit message
    pub summary: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
    /// Committer timestamp in seconds
    pub commit_time: i64,
}

/// The Git interface.
///
/// This is the **single point of interaction** with the object store. All
/// repository reads flow through this interface. No other module should
/// import `git2` directly.
///
/// A `Git` handle is not thread-safe; open one per in-flight request.
///
/// # Example
///
/// ```ignore
/// use revgate::git::Git;
/// use std::path::Path;
///
/// let git = Git::open(Path::new("."))?;
///
/// for entry in git.list_refs()? {
///     println!("{} -> {}", entry.name, entry.target.short(7));
/// }
/// ```
pub struct Git {
    /// The underlying git2 repository
    pub(super) repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository. Bare
    /// repositories are supported.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        Ok(Self { repo })
    }

    /// Get direct access to the git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Identity of this repository for shared caches.
    ///
    /// Two handles opened on the same repository produce the same scope.
    pub fn scope(&self) -> String {
        let path = self.repo.path();
        path.canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .to_string_lossy()
            .into_owned()
    }

    // =========================================================================
    // Ref Lookup
    // =========================================================================

    /// Look up a ref by its exact full name.
    ///
    /// Symbolic refs (e.g., `HEAD`) are followed to their final target.
    /// Returns `Ok(None)` if the ref doesn't exist or is unborn.
    pub fn find_ref(&self, refname: &str) -> Result<Option<RefEntry>, GitError> {
        let reference = match self.repo.find_reference(refname) {
            Ok(r) => r,
            Err(e)
                if e.code() == git2::ErrorCode::NotFound
                    || e.code() == git2::ErrorCode::InvalidSpec =>
            {
                return Ok(None)
            }
            Err(e) => return Err(GitError::from_git2(e, refname)),
        };

        let resolved = match reference.resolve() {
            Ok(r) => r,
            // Dangling symbolic ref, e.g. HEAD on an unborn branch
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, refname)),
        };

        let target = match resolved.target() {
            Some(oid) => from_git2_oid(oid)?,
            None => return Ok(None),
        };
        let name = RefName::new(refname)?;
        let peeled = self.peel_tag_chain(&target)?;

        Ok(Some(RefEntry {
            name,
            target,
            peeled,
        }))
    }

    // =========================================================================
    // Ref Enumeration
    // =========================================================================

    /// List every ref in the repository, in every namespace.
    ///
    /// Refs with non-UTF8 or invalid names are skipped. Symbolic refs are
    /// reported with the target of the ref they point to.
    pub fn list_refs(&self) -> Result<Vec<RefEntry>, GitError> {
        let refs = self.repo.references().map_err(|e| GitError::Internal {
            message: e.message().to_string(),
        })?;
        self.collect_refs(refs)
    }

    /// List all refs matching a prefix.
    ///
    /// # Example
    ///
    /// ```ignore
    /// for entry in git.list_refs_by_prefix("refs/tags/")? {
    ///     println!("{} -> {}", entry.name, entry.target.short(7));
    /// }
    /// ```
    pub fn list_refs_by_prefix(&self, prefix: &str) -> Result<Vec<RefEntry>, GitError> {
        let pattern = format!("{}*", prefix);
        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;
        self.collect_refs(refs)
    }

    fn collect_refs(&self, refs: git2::References<'_>) -> Result<Vec<RefEntry>, GitError> {
        let mut entries = Vec::new();
        for reference in refs {
            let reference = reference.map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

            // Skip refs with non-UTF8 names
            let name = match reference.name() {
                Some(n) => n,
                None => continue,
            };

            // Skip invalid ref names
            let ref_name = match RefName::new(name) {
                Ok(r) => r,
                Err(_) => continue,
            };

            let target = match reference.resolve().ok().and_then(|r| r.target()) {
                Some(oid) => from_git2_oid(oid)?,
                None => continue,
            };
            let peeled = self.peel_tag_chain(&target)?;

            entries.push(RefEntry {
                name: ref_name,
                target,
                peeled,
            });
        }

        Ok(entries)
    }

    // =========================================================================
    // Object Lookup
    // =========================================================================

    /// Resolve a full or abbreviated hex object id to an existing object.
    ///
    /// Returns `Ok(None)` when no object matches, when an abbreviation
    /// matches more than one object, or when `hex` is longer than the
    /// repository's object ids.
    pub fn resolve_hash(&self, hex: &str) -> Result<Option<Oid>, GitError> {
        if !Oid::is_hash_like(hex) || hex.len() > self.oid_hex_len() {
            return Ok(None);
        }

        let found = if hex.len() == self.oid_hex_len() {
            let oid = Oid::new(hex)?;
            self.repo
                .find_object(to_git2_oid(&oid)?, None)
                .map(|obj| obj.id())
        } else {
            self.repo.find_object_by_prefix(hex, None).map(|obj| obj.id())
        };

        match found {
            Ok(id) => Ok(Some(from_git2_oid(id)?)),
            Err(e)
                if matches!(
                    e.code(),
                    git2::ErrorCode::NotFound
                        | git2::ErrorCode::Ambiguous
                        | git2::ErrorCode::InvalidSpec
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(GitError::from_git2(e, hex)),
        }
    }

    /// Length of a full hex object id in this repository.
    pub fn oid_hex_len(&self) -> usize {
        git2::Oid::zero().as_bytes().len() * 2
    }

    /// Parse the header of any object.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the object doesn't exist
    pub fn object_info(&self, oid: &Oid) -> Result<ObjectInfo, GitError> {
        let object = self
            .repo
            .find_object(to_git2_oid(oid)?, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let kind = object_type_of(object.kind(), oid.as_str())?;

        let mut info = ObjectInfo {
            oid: oid.clone(),
            kind,
            target: None,
            tagger_time: None,
            commit_time: None,
            parents: Vec::new(),
        };

        match kind {
            ObjectType::Commit => {
                if let Some(commit) = object.as_commit() {
                    info.commit_time = Some(commit.time().seconds());
                    for parent in commit.parent_ids() {
                        info.parents.push(from_git2_oid(parent)?);
                    }
                }
            }
            ObjectType::Tag => {
                if let Some(tag) = object.as_tag() {
                    info.target = Some(from_git2_oid(tag.target_id())?);
                    info.tagger_time = tag.tagger().map(|sig| sig.when().seconds());
                }
            }
            ObjectType::Tree | ObjectType::Blob => {}
        }

        Ok(info)
    }

    /// Get the type of an object.
    pub fn object_type(&self, oid: &Oid) -> Result<ObjectType, GitError> {
        let object = self
            .repo
            .find_object(to_git2_oid(oid)?, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        object_type_of(object.kind(), oid.as_str())
    }

    /// Fully unwind a chain of annotated tags.
    ///
    /// Returns `Ok(None)` if `oid` is not a tag, otherwise the first non-tag
    /// object reached by following tag targets.
    pub fn peel_tag_chain(&self, oid: &Oid) -> Result<Option<Oid>, GitError> {
        let mut current = to_git2_oid(oid)?;
        let mut peeled = false;

        loop {
            let object = self
                .repo
                .find_object(current, None)
                .map_err(|e| GitError::from_git2(e, &current.to_string()))?;
            match object.as_tag() {
                Some(tag) => {
                    current = tag.target_id();
                    peeled = true;
                }
                None => break,
            }
        }

        if peeled {
            Ok(Some(from_git2_oid(current)?))
        } else {
            Ok(None)
        }
    }

    // =========================================================================
    // Commit Information
    // =========================================================================

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .with_timezone(&chrono::Utc);

        let mut parents = Vec::new();
        for parent in commit.parent_ids() {
            parents.push(from_git2_oid(parent)?);
        }

        Ok(CommitInfo {
            oid: oid.clone(),
            parents,
            summary: commit.summary().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
            commit_time: commit.time().seconds(),
        })
    }

    /// Get the parent OIDs of a commit.
    ///
    /// Returns empty vec for root commits, multiple OIDs for merge commits.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotACommit`] if `oid` names another kind of object
    pub fn commit_parents(&self, oid: &Oid) -> Result<Vec<Oid>, GitError> {
        let info = self.object_info(oid)?;
        match info.kind {
            ObjectType::Commit => Ok(info.parents),
            kind => Err(GitError::NotACommit {
                oid: oid.to_string(),
                kind,
            }),
        }
    }
}
