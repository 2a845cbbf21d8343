//! visibility
//!
//! Decides whether an object may be exposed to a caller.
//!
//! An object is visible when it is exactly the tip of some ref, or when it
//! is reachable from a browsable tip. Refs under excluded namespaces (pending
//! changes by default) never seed the ancestry search.
//!
//! - [`VisibilityChecker`]: stateless tip and reachability primitives
//! - [`VisibilityCache`]: shared memoization around the checker

mod cache;
mod checker;

pub use cache::{CacheStats, VisibilityCache, VisibilityQuery};
pub use checker::{TipSet, VisibilityChecker};
