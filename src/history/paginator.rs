//! history::paginator
//!
//! One page of a commit walk, with stable resume markers.
//!
//! # Markers
//!
//! - `next_start`: the commit right after the page, or `None` at the end
//! - `previous_start`: `None` on the first page; the commit exactly one page
//!   size before `start` when at least a page was skipped; otherwise the
//!   first commit of the walk
//!
//! Following `previous_start` from any page reaches the top of the walk in
//! at most one extra hop.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::core::types::Oid;
use crate::git::{CommitInfo, CommitWalk, GitError};

/// Result of one paginator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub items: Vec<CommitInfo>,
    pub previous_start: Option<Oid>,
    pub next_start: Option<Oid>,
}

/// Paginates an already-seeded [`CommitWalk`].
///
/// Iterating yields the page's commits; once the iterator is exhausted
/// [`previous_start`](Self::previous_start) and
/// [`next_start`](Self::next_start) are final. [`paginate`](Self::paginate)
/// does both at once.
#[derive(Debug)]
pub struct Paginator<'repo> {
    walk: CommitWalk<'repo>,
    limit: usize,
    start: Option<Oid>,
    seeked: bool,
    done: bool,
    pending: Option<Oid>,
    returned: usize,
    previous_start: Option<Oid>,
    next_start: Option<Oid>,
}

impl<'repo> Paginator<'repo> {
    /// Create a paginator over `walk`.
    ///
    /// `limit` is the page size; 0 is treated as 1. `start` is the inclusive
    /// resume point; `None` starts at the top.
    pub fn new(walk: CommitWalk<'repo>, limit: usize, start: Option<Oid>) -> Self {
        Self {
            walk,
            limit: limit.max(1),
            start,
            seeked: false,
            done: false,
            pending: None,
            returned: 0,
            previous_start: None,
            next_start: None,
        }
    }

    /// Run to the end of the page.
    pub fn paginate(mut self) -> Result<Page, GitError> {
        let items = self.by_ref().collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            previous_start: self.previous_start,
            next_start: self.next_start,
        })
    }

    pub fn previous_start(&self) -> Option<&Oid> {
        self.previous_start.as_ref()
    }

    pub fn next_start(&self) -> Option<&Oid> {
        self.next_start.as_ref()
    }

    /// Advance to `start`, recording the previous-page marker.
    fn seek(&mut self) -> Result<(), GitError> {
        let Some(start) = self.start.clone() else {
            self.pending = self.walk.next().transpose()?;
            return Ok(());
        };

        let mut first: Option<Oid> = None;
        let mut window: VecDeque<Oid> = VecDeque::with_capacity(self.limit);
        let mut skip = 0usize;

        while let Some(oid) = self.walk.next().transpose()? {
            if oid == start {
                self.previous_start = if skip == 0 {
                    None
                } else if skip >= self.limit {
                    window.pop_front()
                } else {
                    first
                };
                self.pending = Some(oid);
                return Ok(());
            }
            if first.is_none() {
                first = Some(oid.clone());
            }
            skip += 1;
            window.push_back(oid);
            if window.len() > self.limit {
                window.pop_front();
            }
        }

        debug!(start = %start.short(7), skipped = skip, "start not in walk, paginating from top");
        if skip > 0 {
            self.walk.rewind()?;
        }
        self.pending = self.walk.next().transpose()?;
        Ok(())
    }

    fn step(&mut self) -> Result<Option<CommitInfo>, GitError> {
        if !self.seeked {
            self.seeked = true;
            self.seek()?;
        }

        if self.returned == self.limit {
            self.next_start = self.walk.next().transpose()?;
            self.done = true;
            return Ok(None);
        }

        let next = match self.pending.take() {
            Some(oid) => Some(oid),
            None if self.returned == 0 => None,
            None => self.walk.next().transpose()?,
        };
        let Some(oid) = next else {
            self.done = true;
            return Ok(None);
        };

        self.returned += 1;
        self.walk.git().commit_info(&oid).map(Some)
    }
}

impl Iterator for Paginator<'_> {
    type Item = Result<CommitInfo, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(commit)) => Some(Ok(commit)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
