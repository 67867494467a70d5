//! # Beetle Test Utilities
//!
//! Shared testing utilities for the workspace:
//! - Determinism test harness
//! - Roster and match fixtures
//! - Batch matchup runner
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
