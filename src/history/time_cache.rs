//! history::time_cache
//!
//! Memoized sort times for arbitrary objects.
//!
//! # Rules
//!
//! - Commit: committer time
//! - Annotated tag with a tagger: tagger time, never inherited
//! - Annotated tag without a tagger: time of the object it points at
//! - Tree or blob: [`NO_TIME`]
//!
//! Object times never change, so entries are never invalidated.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::trace;

use crate::core::types::{ObjectType, Oid};
use crate::git::{Git, GitError};

/// Time of objects that carry no timestamp.
pub const NO_TIME: i64 = i64::MIN;

/// Shared object time cache.
#[derive(Debug, Default)]
pub struct TimeCache {
    times: RwLock<HashMap<Oid, i64>>,
}

impl TimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the time of `id` in seconds since the epoch.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if `id` or a tag target is missing
    pub fn get_time(&self, git: &Git, id: &Oid) -> Result<i64, GitError> {
        if let Some(time) = self.cached(id) {
            return Ok(time);
        }

        // Taggerless tags inherit from their target; resolve the chain
        // without recursion and record every link.
        let mut pending: Vec<Oid> = Vec::new();
        let mut current = id.clone();
        let time = loop {
            if let Some(time) = self.cached(&current) {
                break time;
            }
            let info = git.object_info(&current)?;
            match info.kind {
                ObjectType::Commit => break info.commit_time.unwrap_or(NO_TIME),
                ObjectType::Tag => match (info.tagger_time, info.target) {
                    (Some(time), _) => break time,
                    (None, Some(target)) => {
                        pending.push(current);
                        current = target;
                    }
                    (None, None) => break NO_TIME,
                },
                ObjectType::Tree | ObjectType::Blob => break NO_TIME,
            }
        };

        trace!(id = %id.short(7), time, inherited = pending.len(), "derived object time");
        if let Ok(mut times) = self.times.write() {
            times.insert(current, time);
            for oid in pending {
                times.insert(oid, time);
            }
        }
        Ok(time)
    }

    /// Number of memoized objects.
    pub fn len(&self) -> usize {
        self.times.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, id: &Oid) -> Option<i64> {
        self.times.read().ok()?.get(id).copied()
    }
}
