//! git
//!
//! Single interface for all object store operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads flow
//! through this interface. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening (bare or not)
//! - Ref lookup by exact name and enumeration by namespace
//! - Object lookup by full or abbreviated id, header parsing, tag peeling
//! - Ordered commit walks ([`CommitWalk`])
//!
//! # Invariants
//!
//! - Read-only: nothing here mutates the repository
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, ObjectType, RefName)
//! - Missing user-named objects are `Ok(None)`; storage faults are `Err`

mod interface;
mod walk;

pub use interface::{CommitInfo, Git, GitError, ObjectInfo, RefEntry};
pub use walk::CommitWalk;
