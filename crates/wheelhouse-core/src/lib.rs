//! Core data types for the Wheelhouse mirroring tool.
//!
//! This crate defines the fundamental types of a resolution run: parsed
//! requirements, PEP 440-style versions and specifiers, the target
//! interpreter, and the fixed mirror target platforms.
//!
//! This crate is intentionally free of async code and network I/O.

/// Default target interpreter version used when none is given.
pub const DEFAULT_PYTHON_VERSION: &str = "3.12";

pub mod interpreter;
pub mod requirement;
pub mod target;
pub mod version;
