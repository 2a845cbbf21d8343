//! revgate - Safe resolution of revision expressions over a Git object store
//!
//! revgate turns short textual revision expressions (ref names, abbreviated
//! hashes, `^`/`~` ancestry, `A^!` and `A..B`) into concrete objects, while
//! guaranteeing that nothing is resolved unless it is reachable from a
//! browsable ref. It also pages through history with stable resume markers
//! and derives sort times for any object.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain types and configuration
//! - [`git`] - Single interface for all object store reads
//! - [`visibility`] - Reachability checks and the shared visibility cache
//! - [`revision`] - Revision expression parsing
//! - [`history`] - Pagination, object times and tag ordering
//! - [`cli`] - Command-line inspection tool
//!
//! # Correctness Invariants
//!
//! 1. A revision is only built for an object that is a ref tip or passes
//!    the visibility check
//! 2. Malformed, unresolvable and hidden expressions are indistinguishable
//! 3. Storage faults are errors, never "not found"
//! 4. Positive visibility is cached forever; negative visibility never
//!    outlives the ref state it was computed against

pub mod cli;
pub mod core;
pub mod git;
pub mod history;
pub mod revision;
pub mod visibility;
