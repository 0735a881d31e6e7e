//! # Farm Test Utilities
//!
//! Shared testing utilities for the farm crates:
//! - Determinism and partition test harness
//! - Fixture builders
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
