//! Shared utilities for the Wheelhouse mirroring tool.
//!
//! This crate provides cross-cutting concerns used by all other Wheelhouse
//! crates: error types, filesystem helpers, and terminal progress indicators.

pub mod errors;
pub mod fs;
pub mod progress;
