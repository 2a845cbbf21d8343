//! revision
//!
//! Textual revision expressions and what they resolve to.
//!
//! # Grammar
//!
//! ```text
//! expr     := range | first-parent | single
//! range    := fragment ".." fragment [path]
//! first-parent := fragment "^!" [path]
//! single   := fragment [path]
//! fragment := base suffix*
//! suffix   := "^" [digits] | "~" [digits]
//! base     := refname | abbreviated-or-full-hash
//! path     := "/" ...
//! ```
//!
//! Dereference markers (`^{}`, `^{type}`), `rev:path` and reflog forms
//! (`@{n}`) are rejected.
//!
//! # Failure
//!
//! Malformed, unresolvable and hidden expressions all yield `Ok(None)` so a
//! caller cannot tell them apart. Only storage faults are `Err`.

mod parser;

pub use parser::RevisionParser;

use serde::Serialize;

use crate::core::types::{ObjectType, Oid};
use crate::git::{Git, GitError};

/// A resolved revision.
///
/// Constructed only by [`RevisionParser`]. For annotated tags the peeled
/// fields hold the object at the end of the tag chain; for every other kind
/// they repeat `id` and `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    name: String,
    id: Oid,
    #[serde(rename = "type")]
    kind: Option<ObjectType>,
    peeled_id: Option<Oid>,
    #[serde(rename = "peeled_type")]
    peeled_kind: Option<ObjectType>,
}

impl Revision {
    /// The "absent" revision, e.g. the old side of `root^!`.
    pub fn null() -> Self {
        Self {
            name: String::new(),
            id: Oid::zero(),
            kind: None,
            peeled_id: None,
            peeled_kind: None,
        }
    }

    /// Resolve the peeled fields of `id` and name it.
    pub(crate) fn peel(git: &Git, name: impl Into<String>, id: Oid) -> Result<Self, GitError> {
        let kind = git.object_type(&id)?;
        let (peeled_id, peeled_kind) = match kind {
            ObjectType::Tag => match git.peel_tag_chain(&id)? {
                Some(target) => {
                    let target_kind = git.object_type(&target)?;
                    (target, target_kind)
                }
                None => (id.clone(), kind),
            },
            ObjectType::Commit | ObjectType::Tree | ObjectType::Blob => (id.clone(), kind),
        };

        Ok(Self {
            name: name.into(),
            id,
            kind: Some(kind),
            peeled_id: Some(peeled_id),
            peeled_kind: Some(peeled_kind),
        })
    }

    /// A revision for a commit id already known to be a commit.
    pub(crate) fn commit(name: impl Into<String>, id: Oid) -> Self {
        Self {
            name: name.into(),
            id: id.clone(),
            kind: Some(ObjectType::Commit),
            peeled_id: Some(id),
            peeled_kind: Some(ObjectType::Commit),
        }
    }

    /// The expression fragment that produced this revision.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &Oid {
        &self.id
    }

    /// Object kind of `id`; `None` only for [`Revision::null`].
    pub fn kind(&self) -> Option<ObjectType> {
        self.kind
    }

    pub fn peeled_id(&self) -> Option<&Oid> {
        self.peeled_id.as_ref()
    }

    pub fn peeled_kind(&self) -> Option<ObjectType> {
        self.peeled_kind
    }

    /// The peeled id, falling back to `id`.
    pub fn peeled_or_id(&self) -> &Oid {
        self.peeled_id.as_ref().unwrap_or(&self.id)
    }

    /// Check if this is the absent revision.
    pub fn is_null(&self) -> bool {
        self.kind.is_none() && self.id.is_zero()
    }

    /// Check if the revision was named by its full hash.
    pub fn name_is_id(&self) -> bool {
        self.name == self.id.as_str()
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::null()
    }
}

/// One parse outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// The single revision, or the new side of a diff.
    pub revision: Revision,
    /// Old side of a diff; [`Revision::null`] otherwise.
    #[serde(skip_serializing_if = "Revision::is_null")]
    pub old_revision: Revision,
    /// Residual path. Empty, or starts with `/`.
    pub path: String,
}

impl ParseResult {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            old_revision: Revision::null(),
            path: String::new(),
        }
    }

    pub fn with_old_revision(mut self, old_revision: Revision) -> Self {
        self.old_revision = old_revision;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Check if this result names two sides.
    pub fn is_diff(&self) -> bool {
        !self.old_revision.is_null()
    }
}
