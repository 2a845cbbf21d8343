//! history
//!
//! Walking and ordering history for listing views.
//!
//! - [`Paginator`]: one page of a seeded commit walk
//! - [`TimeCache`]: memoized object times used as sort keys
//! - [`tags::list_tags`]: tags newest first

mod paginator;
pub mod tags;
mod time_cache;

pub use paginator::{Page, Paginator};
pub use time_cache::{TimeCache, NO_TIME};

use crate::git::{CommitWalk, Git, GitError};
use crate::revision::ParseResult;

/// Seed a walk for a parse result.
///
/// The new side is pushed; a non-null old side is hidden, so a range
/// `A..B` lists the commits in `B` that are not in `A`.
///
/// # Errors
///
/// - [`GitError::NotACommit`] if either side does not peel to a commit
pub fn seed_walk<'repo>(
    git: &'repo Git,
    result: &ParseResult,
) -> Result<CommitWalk<'repo>, GitError> {
    let mut walk = CommitWalk::new(git)?;
    walk.push(result.revision.peeled_or_id())?;
    if !result.old_revision.is_null() {
        walk.hide(result.old_revision.peeled_or_id())?;
    }
    Ok(walk)
}
