//! Graph-aware workspace analysis
//!
//! Built on cargo_metadata + petgraph for direct control and minimal abstraction.
//! No guppy - we own our domain types and queries.

pub mod project_graph;

pub use project_graph::{ProjectGraph, ProjectNode};
