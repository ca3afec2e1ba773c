//! Dependency resolution engine for Wheelhouse.
//!
//! Orchestrates the leaf components into a depth-first, cycle-safe
//! traversal from root requirements to a deduplicated multi-target
//! download plan: version selection, artifact compatibility selection,
//! and dependency extraction against a package provider.

pub mod deps;
pub mod graph;
pub mod provider;
pub mod report;
pub mod resolver;
pub mod select;
