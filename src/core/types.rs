//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`ObjectType`] - The closed set of Git object kinds
//! - [`RefName`] - Validated Git reference name
//! - [`Fingerprint`] - Hash of a ref set, used as a ref generation marker
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use revgate::core::types::{Oid, RefName};
//!
//! // Valid constructions
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = RefName::new("refs/heads/main").unwrap();
//!
//! // Invalid constructions fail at creation time
//! assert!(RefName::new("refs/heads/invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency. Equality and hashing
/// are by value.
///
/// # Example
///
/// ```
/// use revgate::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
///
/// // Zero OID for null revisions
/// let zero = Oid::zero();
/// assert!(zero.is_zero());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// The zero OID (40 zeros for SHA-1).
    const ZERO_SHA1: &'static str = "0000000000000000000000000000000000000000";

    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Create the zero/null OID (40 zeros).
    pub fn zero() -> Self {
        Self(Self::ZERO_SHA1.to_string())
    }

    /// Check if this is the zero/null OID.
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    ///
    /// # Example
    ///
    /// ```
    /// use revgate::core::types::Oid;
    ///
    /// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(oid.short(7), "abc123d");
    /// assert_eq!(oid.short(4), "abc1");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Check whether `s` could be an abbreviated or full object id.
    ///
    /// Git refuses prefixes shorter than four characters.
    ///
    /// # Example
    ///
    /// ```
    /// use revgate::core::types::Oid;
    ///
    /// assert!(Oid::is_hash_like("abc1"));
    /// assert!(!Oid::is_hash_like("abc"));
    /// assert!(!Oid::is_hash_like("main"));
    /// ```
    pub fn is_hash_like(s: &str) -> bool {
        (4..=64).contains(&s.len()) && s.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a Git object.
///
/// The set is closed and fixed by the storage format, so every consumer
/// matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectType {
    /// Lowercase name as used by Git itself.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Commit => "commit",
            ObjectType::Tree => "tree",
            ObjectType::Blob => "blob",
            ObjectType::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated Git reference name.
///
/// Reference names must conform to Git's refname rules (see `git check-ref-format`).
///
/// # Example
///
/// ```
/// use revgate::core::types::RefName;
///
/// let refname = RefName::new("refs/heads/feature/foo").unwrap();
/// assert!(refname.is_branch_ref());
/// assert_eq!(refname.strip_prefix("refs/heads/"), Some("feature/foo"));
///
/// let tag = RefName::for_tag("v1.0");
/// assert_eq!(tag.as_str(), "refs/tags/v1.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Namespace holding branches.
    pub const HEADS: &'static str = "refs/heads/";
    /// Namespace holding tags.
    pub const TAGS: &'static str = "refs/tags/";

    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create a ref name for a branch (`refs/heads/<name>`).
    ///
    /// The caller is responsible for `name` being a valid short name.
    pub fn for_branch(name: &str) -> Self {
        Self(format!("{}{}", Self::HEADS, name))
    }

    /// Create a ref name for a tag (`refs/tags/<name>`).
    ///
    /// The caller is responsible for `name` being a valid short name.
    pub fn for_tag(name: &str) -> Self {
        Self(format!("{}{}", Self::TAGS, name))
    }

    /// Strip a prefix from the ref name and return the remainder.
    ///
    /// Returns `None` if the ref doesn't start with the given prefix.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Check if this ref is a branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with(Self::HEADS)
    }

    /// Check if this ref is a tag ref.
    pub fn is_tag_ref(&self) -> bool {
        self.0.starts_with(Self::TAGS)
    }

    /// Check if this ref lives under any of the given namespace prefixes.
    pub fn in_any_namespace<S: AsRef<str>>(&self, namespaces: &[S]) -> bool {
        namespaces.iter().any(|ns| self.0.starts_with(ns.as_ref()))
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        // Cannot be empty
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        // Cannot start with "/"
        if name.starts_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '/'".into(),
            ));
        }

        // Cannot end with "/" or ".lock"
        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        // Cannot contain "..", "@{", or "//"
        if name.contains("..") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain '//'".into(),
            ));
        }

        // Cannot contain certain special characters
        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        // Cannot contain ASCII control characters
        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        // Check each component
        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stable hash over a set of ref values.
///
/// Any ref creation, deletion or update changes the fingerprint, which makes
/// it usable as a ref generation counter for caches that must not outlive
/// the ref set they were computed against.
///
/// # Example
///
/// ```
/// use revgate::core::types::{Fingerprint, RefName, Oid};
///
/// let refs = vec![
///     (RefName::new("refs/heads/main").unwrap(),
///      Oid::new("abc123def4567890abc123def4567890abc12345").unwrap()),
///     (RefName::new("refs/heads/feature").unwrap(),
///      Oid::new("def456abc7890123def456abc7890123def45678").unwrap()),
/// ];
///
/// let fp = Fingerprint::compute(&refs);
///
/// // Same refs produce same fingerprint
/// let fp2 = Fingerprint::compute(&refs);
/// assert_eq!(fp, fp2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a set of (refname, oid) pairs.
    ///
    /// The refs are sorted by refname before hashing to ensure determinism
    /// regardless of input order.
    pub fn compute(refs: &[(RefName, Oid)]) -> Self {
        let mut sorted: Vec<_> = refs.iter().collect();
        sorted.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

        let mut hasher = Sha256::new();
        for (refname, oid) in sorted {
            hasher.update(refname.as_str().as_bytes());
            hasher.update(b"\0");
            hasher.update(oid.as_str().as_bytes());
            hasher.update(b"\n");
        }

        let result = hasher.finalize();
        Self(hex::encode(result))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod oid {
        use super::*;

        #[test]
        fn valid_sha1() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.as_str().len(), 40);
        }

        #[test]
        fn valid_sha256() {
            let oid = Oid::new("a".repeat(64)).unwrap();
            assert_eq!(oid.as_str().len(), 64);
        }

        #[test]
        fn normalized_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn wrong_length_rejected() {
            assert!(Oid::new("abc123").is_err());
            assert!(Oid::new("a".repeat(41)).is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Oid::new("g".repeat(40)).is_err());
        }

        #[test]
        fn zero_oid() {
            assert!(Oid::zero().is_zero());
            assert!(!Oid::new("1".repeat(40)).unwrap().is_zero());
        }

        #[test]
        fn short_clamps_to_length() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(100), oid.as_str());
        }

        #[test]
        fn hash_like() {
            assert!(Oid::is_hash_like("deadbeef"));
            assert!(Oid::is_hash_like(&"a".repeat(40)));
            assert!(Oid::is_hash_like(&"a".repeat(64)));
            assert!(!Oid::is_hash_like(&"a".repeat(65)));
            assert!(!Oid::is_hash_like("dea"));
            assert!(!Oid::is_hash_like("master"));
        }

        #[test]
        fn serde_roundtrip() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            let json = serde_json::to_string(&oid).unwrap();
            assert_eq!(json, "\"abc123def4567890abc123def4567890abc12345\"");
            let parsed: Oid = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, oid);
        }
    }

    mod object_type {
        use super::*;

        #[test]
        fn display_matches_git() {
            assert_eq!(ObjectType::Commit.to_string(), "commit");
            assert_eq!(ObjectType::Tree.to_string(), "tree");
            assert_eq!(ObjectType::Blob.to_string(), "blob");
            assert_eq!(ObjectType::Tag.to_string(), "tag");
        }

        #[test]
        fn serializes_lowercase() {
            assert_eq!(serde_json::to_string(&ObjectType::Tag).unwrap(), "\"tag\"");
        }
    }

    mod ref_name {
        use super::*;

        #[test]
        fn valid_ref_names() {
            assert!(RefName::new("HEAD").is_ok());
            assert!(RefName::new("refs/heads/main").is_ok());
            assert!(RefName::new("refs/changes/34/1234/1").is_ok());
            assert!(RefName::new("refs/meta/config").is_ok());
        }

        #[test]
        fn invalid_ref_names() {
            assert!(RefName::new("").is_err());
            assert!(RefName::new("/refs/heads/main").is_err());
            assert!(RefName::new("refs/heads/").is_err());
            assert!(RefName::new("refs/heads/a..b").is_err());
            assert!(RefName::new("refs/heads/a@{1}").is_err());
            assert!(RefName::new("refs/heads/a^").is_err());
            assert!(RefName::new("refs/heads/.hidden").is_err());
            assert!(RefName::new("refs/heads/x.lock").is_err());
        }

        #[test]
        fn namespaces() {
            let branch = RefName::for_branch("main");
            assert!(branch.is_branch_ref());
            assert!(!branch.is_tag_ref());

            let change = RefName::new("refs/changes/01/1/1").unwrap();
            assert!(change.in_any_namespace(&["refs/changes/"]));
            assert!(!change.in_any_namespace(&["refs/heads/", "refs/tags/"]));
            assert!(!change.in_any_namespace::<&str>(&[]));
        }
    }

    mod fingerprint {
        use super::*;

        fn entry(name: &str, oid: char) -> (RefName, Oid) {
            (
                RefName::new(name).unwrap(),
                Oid::new(oid.to_string().repeat(40)).unwrap(),
            )
        }

        #[test]
        fn order_independent() {
            let a = vec![entry("refs/heads/a", '1'), entry("refs/heads/b", '2')];
            let b = vec![entry("refs/heads/b", '2'), entry("refs/heads/a", '1')];
            assert_eq!(Fingerprint::compute(&a), Fingerprint::compute(&b));
        }

        #[test]
        fn changes_when_a_ref_moves() {
            let a = vec![entry("refs/heads/a", '1')];
            let b = vec![entry("refs/heads/a", '2')];
            assert_ne!(Fingerprint::compute(&a), Fingerprint::compute(&b));
        }

        #[test]
        fn changes_when_a_ref_is_added() {
            let a = vec![entry("refs/heads/a", '1')];
            let b = vec![entry("refs/heads/a", '1'), entry("refs/tags/v1", '1')];
            assert_ne!(Fingerprint::compute(&a), Fingerprint::compute(&b));
        }
    }
}
