//! visibility::checker
//!
//! Stateless reachability primitives over the commit graph.
//!
//! The checker only knows the exclusion policy (which ref namespaces never
//! seed an ancestry search). Everything else is passed in per call, so a
//! single checker can be shared by every request.

use std::collections::HashSet;

use tracing::trace;

use crate::core::types::{ObjectType, Oid, RefName};
use crate::git::{CommitWalk, Git, GitError, RefEntry};

/// Ref tips grouped in the order they are searched.
///
/// Branches are the most likely to contain a commit, then tags, then any
/// other non-excluded namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipSet {
    pub heads: Vec<Oid>,
    pub tags: Vec<Oid>,
    pub other: Vec<Oid>,
}

impl TipSet {
    /// All tips, in search order.
    pub fn stages(&self) -> [&[Oid]; 3] {
        [&self.heads, &self.tags, &self.other]
    }

    /// Check if no tip is present.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty() && self.tags.is_empty() && self.other.is_empty()
    }
}

/// Reachability primitives.
#[derive(Debug, Clone)]
pub struct VisibilityChecker {
    excluded_namespaces: Vec<String>,
}

impl VisibilityChecker {
    /// Create a checker that never searches from refs under `excluded_namespaces`.
    pub fn new(excluded_namespaces: Vec<String>) -> Self {
        Self {
            excluded_namespaces,
        }
    }

    /// The namespaces excluded from ancestry searches.
    pub fn excluded_namespaces(&self) -> &[String] {
        &self.excluded_namespaces
    }

    /// True iff `id` is exactly what some ref points at.
    ///
    /// This deliberately ignores the exclusion policy: a caller holding the
    /// exact id of an excluded tip learns nothing new by resolving it. Both
    /// the direct target and the peeled target of each ref count.
    pub fn is_tip_of_branch(&self, refs: &[RefEntry], id: &Oid) -> bool {
        refs.iter()
            .any(|r| &r.target == id || r.peeled.as_ref() == Some(id))
    }

    /// Check whether a ref may seed an ancestry search.
    pub fn is_browsable(&self, name: &RefName) -> bool {
        !name.in_any_namespace(&self.excluded_namespaces)
    }

    /// Group the tips of all browsable refs.
    ///
    /// Annotated tags contribute the object they peel to. Duplicates are
    /// dropped, keeping the earliest stage.
    pub fn browsable_tips(&self, refs: &[RefEntry]) -> TipSet {
        let mut seen = HashSet::new();
        let mut tips = TipSet::default();

        let mut sorted: Vec<&RefEntry> = refs.iter().filter(|r| self.is_browsable(&r.name)).collect();
        sorted.sort_by_key(|r| {
            if r.name.is_branch_ref() {
                0
            } else if r.name.is_tag_ref() {
                1
            } else {
                2
            }
        });

        for entry in sorted {
            let tip = entry.peeled_or_target().clone();
            if !seen.insert(tip.clone()) {
                continue;
            }
            if entry.name.is_branch_ref() {
                tips.heads.push(tip);
            } else if entry.name.is_tag_ref() {
                tips.tags.push(tip);
            } else {
                tips.other.push(tip);
            }
        }

        tips
    }

    /// True iff `target` equals or is an ancestor of any commit in `starters`.
    ///
    /// Non-commit starters are ignored; a non-commit target is never
    /// reachable. The walk stops at the first match.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if `target` or a starter is missing
    pub fn is_reachable_from(
        &self,
        git: &Git,
        target: &Oid,
        starters: &[Oid],
    ) -> Result<bool, GitError> {
        self.is_reachable_beyond(git, target, starters, &[])
    }

    /// Like [`is_reachable_from`](Self::is_reachable_from), but skips history
    /// already covered by `searched`.
    ///
    /// Callers searching in stages pass the starters of earlier stages here;
    /// if `target` were reachable from them it would already have been found.
    pub fn is_reachable_beyond(
        &self,
        git: &Git,
        target: &Oid,
        starters: &[Oid],
        searched: &[Oid],
    ) -> Result<bool, GitError> {
        if starters.is_empty() {
            return Ok(false);
        }
        if starters.contains(target) {
            return Ok(true);
        }
        if git.object_type(target)? != ObjectType::Commit {
            return Ok(false);
        }

        let mut walk = CommitWalk::new(git)?;
        let mut pushed = 0usize;
        for starter in starters {
            if git.object_type(starter)? == ObjectType::Commit {
                walk.push(starter)?;
                pushed += 1;
            }
        }
        if pushed == 0 {
            return Ok(false);
        }
        for oid in searched {
            if git.object_type(oid)? == ObjectType::Commit {
                walk.hide(oid)?;
            }
        }

        let mut visited = 0usize;
        for oid in walk {
            let oid = oid?;
            visited += 1;
            if &oid == target {
                trace!(target = %target.short(7), visited, "reachable");
                return Ok(true);
            }
        }

        trace!(target = %target.short(7), visited, "not reachable");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    fn entry(name: &str, target: char, peeled: Option<char>) -> RefEntry {
        RefEntry {
            name: RefName::new(name).unwrap(),
            target: oid(target),
            peeled: peeled.map(oid),
        }
    }

    fn checker() -> VisibilityChecker {
        VisibilityChecker::new(vec!["refs/changes/".to_string()])
    }

    #[test]
    fn tip_matches_any_namespace() {
        let refs = vec![
            entry("refs/heads/main", '1', None),
            entry("refs/changes/01/1/1", '2', None),
        ];
        assert!(checker().is_tip_of_branch(&refs, &oid('1')));
        assert!(checker().is_tip_of_branch(&refs, &oid('2')));
        assert!(!checker().is_tip_of_branch(&refs, &oid('3')));
    }

    #[test]
    fn tip_matches_peeled_target() {
        let refs = vec![entry("refs/tags/v1", 'a', Some('b'))];
        assert!(checker().is_tip_of_branch(&refs, &oid('a')));
        assert!(checker().is_tip_of_branch(&refs, &oid('b')));
    }

    #[test]
    fn browsable_tips_grouped_and_filtered() {
        let refs = vec![
            entry("refs/meta/config", '4', None),
            entry("refs/tags/v1", 'a', Some('3')),
            entry("refs/changes/01/1/1", '5', None),
            entry("refs/heads/main", '1', None),
            entry("refs/heads/dev", '2', None),
        ];

        let tips = checker().browsable_tips(&refs);

        assert_eq!(tips.heads, vec![oid('1'), oid('2')]);
        assert_eq!(tips.tags, vec![oid('3')]);
        assert_eq!(tips.other, vec![oid('4')]);
    }

    #[test]
    fn duplicate_tips_kept_in_earliest_stage() {
        let refs = vec![
            entry("refs/tags/v1", '1', None),
            entry("refs/heads/main", '1', None),
        ];

        let tips = checker().browsable_tips(&refs);

        assert_eq!(tips.heads, vec![oid('1')]);
        assert!(tips.tags.is_empty());
    }

    #[test]
    fn empty_exclusion_list_keeps_everything() {
        let refs = vec![entry("refs/changes/01/1/1", '5', None)];
        let tips = VisibilityChecker::new(Vec::new()).browsable_tips(&refs);
        assert_eq!(tips.other, vec![oid('5')]);
    }
}
