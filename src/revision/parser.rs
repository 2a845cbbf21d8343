//! revision::parser
//!
//! Turns revision expressions into visibility-checked [`ParseResult`]s.

use tracing::debug;

use super::{ParseResult, Revision};
use crate::core::types::{ObjectType, Oid, RefName};
use crate::git::{Git, GitError};
use crate::visibility::{VisibilityCache, VisibilityQuery};

/// Characters that only appear in forms this parser refuses.
const FORBIDDEN: &[char] = &[':', '@', '{', '}', '!'];

/// One ancestor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    /// `^N`: N-th parent, 1-based.
    Parent(u32),
    /// `~N`: N-th first-parent ancestor.
    Ancestor(u32),
}

/// A fragment split into its base and ancestor suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment<'e> {
    base: &'e str,
    suffixes: Vec<Suffix>,
}

impl<'e> Fragment<'e> {
    /// Split `text` into base and suffixes, or `None` if it is not a
    /// supported fragment.
    fn split(text: &'e str) -> Option<Self> {
        if text.is_empty() || text.contains(FORBIDDEN) || text.contains("..") {
            return None;
        }

        // Ref names cannot contain '^' or '~'
        let base_end = text.find(['^', '~']).unwrap_or(text.len());
        let base = &text[..base_end];
        if base.is_empty() || base.starts_with('/') || base.ends_with('/') || base.contains("//")
        {
            return None;
        }

        let mut suffixes = Vec::new();
        let mut rest = &text[base_end..];
        while let Some(op) = rest.chars().next() {
            rest = &rest[op.len_utf8()..];
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let n = if digits_end == 0 {
                1
            } else {
                rest[..digits_end].parse::<u32>().ok()?
            };
            rest = &rest[digits_end..];

            match op {
                '^' if n == 0 => return None,
                '^' => suffixes.push(Suffix::Parent(n)),
                '~' => suffixes.push(Suffix::Ancestor(n)),
                _ => return None,
            }
        }

        Some(Self { base, suffixes })
    }

    fn moves(&self) -> bool {
        self.suffixes.iter().any(|s| *s != Suffix::Ancestor(0))
    }
}

/// Where a base was found.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BaseSource {
    Ref,
    Hash,
}

/// Revision expression parser.
///
/// Parsers are cheap; create one per request around the shared cache.
#[derive(Debug)]
pub struct RevisionParser<'a> {
    git: &'a Git,
    cache: &'a VisibilityCache,
}

impl<'a> RevisionParser<'a> {
    pub fn new(git: &'a Git, cache: &'a VisibilityCache) -> Self {
        Self { git, cache }
    }

    /// Parse an expression.
    ///
    /// Returns `Ok(None)` for malformed, unresolvable or hidden expressions.
    ///
    /// # Errors
    ///
    /// Only storage faults: a missing or unreadable object encountered while
    /// resolving or checking visibility.
    pub fn parse(&self, expr: &str) -> Result<Option<ParseResult>, GitError> {
        let expr = expr.strip_prefix('/').unwrap_or(expr);
        if expr.is_empty() {
            return Ok(None);
        }

        let result = if let Some(dots) = expr.find("..") {
            self.parse_range(&expr[..dots], &expr[dots + 2..])?
        } else if let Some(mark) = expr.find("^!") {
            self.parse_first_parent(&expr[..mark], &expr[mark + 2..])?
        } else {
            self.parse_with_path(expr)?
                .map(|(revision, path)| ParseResult::new(revision).with_path(path))
        };

        if result.is_none() {
            debug!(expr, "revision not found");
        }
        Ok(result)
    }

    // =========================================================================
    // Expression forms
    // =========================================================================

    /// `A..B[/path]`: the new side is checked first, then the old side with
    /// the new side as a known root.
    fn parse_range(&self, old: &str, new: &str) -> Result<Option<ParseResult>, GitError> {
        if old.is_empty() || new.is_empty() {
            return Ok(None);
        }

        let Some((revision, path)) = self.parse_with_path(new)? else {
            return Ok(None);
        };
        let root = revision.peeled_or_id().clone();
        let Some(old_revision) = self.resolve_fragment(old, &[root])? else {
            return Ok(None);
        };

        Ok(Some(
            ParseResult::new(revision)
                .with_old_revision(old_revision)
                .with_path(path),
        ))
    }

    /// `A^![/path]`: `A` against its first parent.
    fn parse_first_parent(&self, name: &str, rest: &str) -> Result<Option<ParseResult>, GitError> {
        if name.is_empty() || !(rest.is_empty() || rest.starts_with('/')) {
            return Ok(None);
        }

        let Some(revision) = self.resolve_fragment(name, &[])? else {
            return Ok(None);
        };
        let Some(commit) = self.peel_to_commit(revision.id())? else {
            debug!(name, "rejected: ^! on a non-commit");
            return Ok(None);
        };

        // The parent is visible through the new side, as in a range
        let old_revision = match self.git.commit_parents(&commit)?.into_iter().next() {
            Some(parent) => Revision::commit(format!("{name}^"), parent),
            None => Revision::null(),
        };

        Ok(Some(
            ParseResult::new(revision)
                .with_old_revision(old_revision)
                .with_path(rest),
        ))
    }

    /// Resolve the longest prefix of `text` that names a visible revision.
    ///
    /// Candidates end at the whole text, then before each `/` from right to
    /// left. The remainder, empty or starting with `/`, is the path.
    fn parse_with_path(&self, text: &str) -> Result<Option<(Revision, String)>, GitError> {
        let mut ends: Vec<usize> = text.match_indices('/').map(|(i, _)| i).collect();
        ends.push(text.len());

        for &end in ends.iter().rev() {
            let candidate = &text[..end];
            if candidate.is_empty() {
                continue;
            }
            if let Some(revision) = self.resolve_fragment(candidate, &[])? {
                return Ok(Some((revision, text[end..].to_string())));
            }
        }
        Ok(None)
    }

    // =========================================================================
    // Fragments
    // =========================================================================

    /// Resolve a fragment with no path.
    fn resolve_fragment(
        &self,
        text: &str,
        known_roots: &[Oid],
    ) -> Result<Option<Revision>, GitError> {
        let Some(fragment) = Fragment::split(text) else {
            return Ok(None);
        };
        let Some((base, source)) = self.resolve_base(fragment.base)? else {
            return Ok(None);
        };
        if source == BaseSource::Hash && !self.is_visible(&base, known_roots)? {
            debug!(text, "rejected: not visible");
            return Ok(None);
        }

        let id = if fragment.suffixes.is_empty() {
            base
        } else {
            let Some(start) = self.peel_to_commit(&base)? else {
                debug!(text, "rejected: suffix on a non-commit");
                return Ok(None);
            };
            match self.walk_suffixes(start, &fragment.suffixes)? {
                Some(id) => id,
                None => {
                    debug!(text, "rejected: ancestor does not exist");
                    return Ok(None);
                }
            }
        };

        // A tip of an excluded namespace is visible while its ancestors are not
        if fragment.moves() && !self.is_visible(&id, known_roots)? {
            debug!(text, "rejected: not visible");
            return Ok(None);
        }

        Ok(Some(Revision::peel(self.git, text, id)?))
    }

    fn is_visible(&self, id: &Oid, known_roots: &[Oid]) -> Result<bool, GitError> {
        let query = VisibilityQuery::new(id.clone()).with_known_roots(known_roots.iter().cloned());
        self.cache.is_visible(self.git, &query)
    }

    /// Resolve a base as a ref, then as a hash.
    ///
    /// Short names are tried as `HEAD`, then tags, then branches. Other
    /// namespaces need a full `refs/...` name.
    fn resolve_base(&self, base: &str) -> Result<Option<(Oid, BaseSource)>, GitError> {
        let candidates: Vec<String> = if base.starts_with("refs/") || base == "HEAD" {
            vec![base.to_string()]
        } else {
            vec![
                format!("{}{}", RefName::TAGS, base),
                format!("{}{}", RefName::HEADS, base),
            ]
        };

        for candidate in &candidates {
            if let Some(entry) = self.git.find_ref(candidate)? {
                return Ok(Some((entry.target, BaseSource::Ref)));
            }
        }

        if Oid::is_hash_like(base) {
            if let Some(oid) = self.git.resolve_hash(base)? {
                return Ok(Some((oid, BaseSource::Hash)));
            }
        }
        Ok(None)
    }

    /// Apply ancestor steps starting at a commit.
    fn walk_suffixes(&self, start: Oid, suffixes: &[Suffix]) -> Result<Option<Oid>, GitError> {
        let mut current = start;
        for suffix in suffixes {
            current = match *suffix {
                Suffix::Parent(n) => {
                    let parents = self.git.commit_parents(&current)?;
                    match parents.into_iter().nth(n as usize - 1) {
                        Some(parent) => parent,
                        None => return Ok(None),
                    }
                }
                Suffix::Ancestor(n) => {
                    for _ in 0..n {
                        current = match self.git.commit_parents(&current)?.into_iter().next() {
                            Some(parent) => parent,
                            None => return Ok(None),
                        };
                    }
                    current
                }
            };
        }
        Ok(Some(current))
    }

    /// Peel tags; `None` if the result is not a commit.
    fn peel_to_commit(&self, id: &Oid) -> Result<Option<Oid>, GitError> {
        let peeled = self.git.peel_tag_chain(id)?.unwrap_or_else(|| id.clone());
        match self.git.object_type(&peeled)? {
            ObjectType::Commit => Ok(Some(peeled)),
            ObjectType::Tree | ObjectType::Blob | ObjectType::Tag => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fragment {
        use super::*;

        #[test]
        fn plain_base() {
            let f = Fragment::split("main").unwrap();
            assert_eq!(f.base, "main");
            assert!(f.suffixes.is_empty());
            assert!(!f.moves());
        }

        #[test]
        fn base_with_slashes() {
            let f = Fragment::split("refs/heads/feature/x~2").unwrap();
            assert_eq!(f.base, "refs/heads/feature/x");
            assert_eq!(f.suffixes, vec![Suffix::Ancestor(2)]);
        }

        #[test]
        fn bare_operators_mean_one() {
            let f = Fragment::split("main^~").unwrap();
            assert_eq!(f.suffixes, vec![Suffix::Parent(1), Suffix::Ancestor(1)]);
        }

        #[test]
        fn chained_suffixes() {
            let f = Fragment::split("main^2~3^").unwrap();
            assert_eq!(
                f.suffixes,
                vec![Suffix::Parent(2), Suffix::Ancestor(3), Suffix::Parent(1)]
            );
            assert!(f.moves());
        }

        #[test]
        fn tilde_zero_is_identity() {
            let f = Fragment::split("main~0").unwrap();
            assert_eq!(f.suffixes, vec![Suffix::Ancestor(0)]);
            assert!(!f.moves());
        }

        #[test]
        fn caret_zero_rejected() {
            assert!(Fragment::split("main^0").is_none());
        }

        #[test]
        fn empty_base_segments_rejected() {
            for text in ["/main", "main/", "refs//heads/main", "feature//x~1"] {
                assert!(Fragment::split(text).is_none(), "accepted {text:?}");
            }
        }

        #[test]
        fn unsupported_forms_rejected() {
            for text in [
                "main^{}",
                "main^{commit}",
                "main:README",
                "main@{1}",
                "@",
                "HEAD@{0}",
                "main^!",
                "",
                "^",
                "~2",
                "a..b",
            ] {
                assert!(Fragment::split(text).is_none(), "accepted {text:?}");
            }
        }

        #[test]
        fn trailing_garbage_rejected() {
            assert!(Fragment::split("main^x").is_none());
            assert!(Fragment::split("main~1/").is_none());
            assert!(Fragment::split("main^é").is_none());
        }

        #[test]
        fn overflowing_count_rejected() {
            assert!(Fragment::split("main~99999999999999999999").is_none());
        }
    }
}
