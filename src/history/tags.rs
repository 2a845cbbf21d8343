//! history::tags
//!
//! Tags ordered by time, newest first.

use std::cmp::Reverse;

use serde::Serialize;

use super::time_cache::TimeCache;
use crate::core::types::{Oid, RefName};
use crate::git::{Git, GitError};

/// A tag and its sort time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    /// Short name (without `refs/tags/`).
    pub name: String,
    pub ref_name: RefName,
    /// The tag object for annotated tags, the tagged object otherwise.
    pub target: Oid,
    /// End of the tag chain, for annotated tags.
    pub peeled: Option<Oid>,
    /// See [`TimeCache::get_time`].
    pub time: i64,
}

/// List tags sorted by time, newest first, ties broken by name.
///
/// At most `limit` tags are returned when a limit is given.
pub fn list_tags(
    git: &Git,
    times: &TimeCache,
    limit: Option<usize>,
) -> Result<Vec<TagEntry>, GitError> {
    let mut tags = Vec::new();
    for entry in git.list_refs_by_prefix(RefName::TAGS)? {
        let Some(name) = entry.name.strip_prefix(RefName::TAGS) else {
            continue;
        };
        let name = name.to_string();
        let time = times.get_time(git, &entry.target)?;
        tags.push(TagEntry {
            name,
            ref_name: entry.name,
            target: entry.target,
            peeled: entry.peeled,
            time,
        });
    }

    sort_tags(&mut tags);
    if let Some(limit) = limit {
        tags.truncate(limit);
    }
    Ok(tags)
}

fn sort_tags(tags: &mut [TagEntry]) {
    tags.sort_by(|a, b| {
        Reverse(a.time)
            .cmp(&Reverse(b.time))
            .then_with(|| a.name.cmp(&b.name))
    });
}
