//! visibility::cache
//!
//! Memoized answer to "may this object be resolved for this request?"
//!
//! # Cache policy
//!
//! Positive results are permanent. The commit graph is append-only, so once
//! an object is reachable from a browsable tip it stays reachable from some
//! object the caller could already name. Positive entries are keyed by
//! `(scope, target)`.
//!
//! Negative results become stale as soon as a ref moves. They are keyed by
//! `(scope, target, generation)`, where the generation is the
//! [`Fingerprint`] of the browsable ref set, and are only recorded for
//! queries without known roots. The negative map is bounded.
//!
//! # Concurrency
//!
//! One cache is shared by every request of a server instance. Both maps sit
//! behind `RwLock`s; a poisoned lock degrades to a cache miss.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::debug;

use super::checker::VisibilityChecker;
use crate::core::config::Config;
use crate::core::types::{Fingerprint, ObjectType, Oid, RefName};
use crate::git::{Git, GitError};

/// Input to [`VisibilityCache::is_visible`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityQuery {
    /// Object whose visibility is in question.
    pub target: Oid,
    /// Commits the caller already proved visible in this request.
    pub known_roots: HashSet<Oid>,
}

impl VisibilityQuery {
    /// Query against the default tip set only.
    pub fn new(target: Oid) -> Self {
        Self {
            target,
            known_roots: HashSet::new(),
        }
    }

    /// Extend the search with caller-asserted starting points.
    pub fn with_known_roots<I>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = Oid>,
    {
        self.known_roots.extend(roots);
        self
    }
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub positive_entries: usize,
    pub negative_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PositiveKey {
    scope: String,
    target: Oid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NegativeKey {
    scope: String,
    target: Oid,
    generation: Fingerprint,
}

/// Shared visibility cache.
#[derive(Debug)]
pub struct VisibilityCache {
    checker: VisibilityChecker,
    negative_capacity: usize,
    positive: RwLock<HashSet<PositiveKey>>,
    negative: RwLock<HashSet<NegativeKey>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VisibilityCache {
    /// Create a cache around `checker`, remembering at most
    /// `negative_capacity` negative results.
    pub fn new(checker: VisibilityChecker, negative_capacity: usize) -> Self {
        Self {
            checker,
            negative_capacity,
            positive: RwLock::new(HashSet::new()),
            negative: RwLock::new(HashSet::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache using the configured exclusion set and bounds.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            VisibilityChecker::new(config.excluded_namespaces()),
            config.negative_cache_entries(),
        )
    }

    /// The underlying checker.
    pub fn checker(&self) -> &VisibilityChecker {
        &self.checker
    }

    /// Decide whether `query.target` may be exposed.
    ///
    /// "Not visible" is `Ok(false)`. Storage faults are `Err`.
    ///
    /// # Algorithm
    ///
    /// 1. Remembered positive: visible
    /// 2. Exact tip of any ref (excluded namespaces included): visible
    /// 3. Not a commit: not visible
    /// 4. Remembered negative for the current ref generation: not visible
    /// 5. Search ancestry from known roots, then branch, tag and other
    ///    browsable tips, each stage skipping history already searched
    pub fn is_visible(&self, git: &Git, query: &VisibilityQuery) -> Result<bool, GitError> {
        let scope = git.scope();
        let target = &query.target;
        let positive_key = PositiveKey {
            scope: scope.clone(),
            target: target.clone(),
        };

        if self.has_positive(&positive_key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(target = %target.short(7), "visibility cache hit");
            return Ok(true);
        }

        let refs = git.list_refs()?;
        if self.checker.is_tip_of_branch(&refs, target) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            self.remember_positive(positive_key);
            return Ok(true);
        }

        if git.object_type(target)? != ObjectType::Commit {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(target = %target.short(7), "non-commit is not a ref tip");
            return Ok(false);
        }

        let browsable: Vec<(RefName, Oid)> = refs
            .iter()
            .filter(|r| self.checker.is_browsable(&r.name))
            .map(|r| (r.name.clone(), r.target.clone()))
            .collect();
        let negative_key = NegativeKey {
            scope,
            target: target.clone(),
            generation: Fingerprint::compute(&browsable),
        };

        if query.known_roots.is_empty() && self.has_negative(&negative_key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(target = %target.short(7), "visibility cache negative hit");
            return Ok(false);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let mut roots: Vec<Oid> = query.known_roots.iter().cloned().collect();
        roots.sort();
        let tips = self.checker.browsable_tips(&refs);

        let mut searched: Vec<Oid> = Vec::new();
        for stage in std::iter::once(roots.as_slice()).chain(tips.stages()) {
            if stage.is_empty() {
                continue;
            }
            if self
                .checker
                .is_reachable_beyond(git, target, stage, &searched)?
            {
                self.remember_positive(positive_key);
                return Ok(true);
            }
            searched.extend(stage.iter().cloned());
        }

        debug!(
            target = %target.short(7),
            known_roots = query.known_roots.len(),
            "not reachable from any browsable tip"
        );
        if query.known_roots.is_empty() {
            self.remember_negative(negative_key);
        }
        Ok(false)
    }

    /// Snapshot of the hit/miss counters and map sizes.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            positive_entries: self.positive.read().map(|p| p.len()).unwrap_or(0),
            negative_entries: self.negative.read().map(|n| n.len()).unwrap_or(0),
        }
    }

    // =========================================================================
    // Map access
    // =========================================================================

    fn has_positive(&self, key: &PositiveKey) -> bool {
        self.positive
            .read()
            .map(|p| p.contains(key))
            .unwrap_or(false)
    }

    fn remember_positive(&self, key: PositiveKey) {
        if let Ok(mut positive) = self.positive.write() {
            positive.insert(key);
        }
    }

    fn has_negative(&self, key: &NegativeKey) -> bool {
        self.negative
            .read()
            .map(|n| n.contains(key))
            .unwrap_or(false)
    }

    fn remember_negative(&self, key: NegativeKey) {
        if self.negative_capacity == 0 {
            return;
        }
        let Ok(mut negative) = self.negative.write() else {
            return;
        };
        if negative.len() >= self.negative_capacity {
            negative.retain(|k| k.scope != key.scope || k.generation == key.generation);
            if negative.len() >= self.negative_capacity {
                debug!(entries = negative.len(), "negative visibility cache full, clearing");
                negative.clear();
            }
        }
        negative.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    fn key(target: char, generation: &str) -> NegativeKey {
        NegativeKey {
            scope: "/repo".to_string(),
            target: oid(target),
            generation: Fingerprint::compute(&[(
                RefName::new("refs/heads/main").unwrap(),
                Oid::new(generation.repeat(40)).unwrap(),
            )]),
        }
    }

    fn cache(capacity: usize) -> VisibilityCache {
        VisibilityCache::new(VisibilityChecker::new(Vec::new()), capacity)
    }

    mod query {
        use super::*;

        #[test]
        fn new_has_no_roots() {
            assert!(VisibilityQuery::new(oid('a')).known_roots.is_empty());
        }

        #[test]
        fn with_known_roots_collects() {
            let q = VisibilityQuery::new(oid('a')).with_known_roots([oid('b'), oid('b'), oid('c')]);
            assert_eq!(q.known_roots.len(), 2);
        }
    }

    mod negative_bound {
        use super::*;

        #[test]
        fn zero_capacity_stores_nothing() {
            let c = cache(0);
            c.remember_negative(key('1', "a"));
            assert!(!c.has_negative(&key('1', "a")));
        }

        #[test]
        fn stale_generations_dropped_first() {
            let c = cache(2);
            c.remember_negative(key('1', "a"));
            c.remember_negative(key('2', "b"));
            c.remember_negative(key('3', "b"));

            assert!(!c.has_negative(&key('1', "a")));
            assert!(c.has_negative(&key('2', "b")));
            assert!(c.has_negative(&key('3', "b")));
        }

        #[test]
        fn cleared_when_current_generation_fills_it() {
            let c = cache(2);
            c.remember_negative(key('1', "b"));
            c.remember_negative(key('2', "b"));
            c.remember_negative(key('3', "b"));

            assert!(!c.has_negative(&key('1', "b")));
            assert!(c.has_negative(&key('3', "b")));
            assert_eq!(c.stats().negative_entries, 1);
        }
    }

    mod stats {
        use super::*;

        #[test]
        fn starts_empty() {
            assert_eq!(cache(4).stats(), CacheStats::default());
        }

        #[test]
        fn counts_positive_entries() {
            let c = cache(4);
            c.remember_positive(PositiveKey {
                scope: "/repo".to_string(),
                target: oid('1'),
            });
            assert_eq!(c.stats().positive_entries, 1);
        }
    }
}
