//! core
//!
//! Core domain types and configuration for Revgate.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, ObjectType, RefName, Fingerprint
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
