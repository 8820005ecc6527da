//! cargo-convoy: publish Cargo workspace release groups in one orchestrated pass
//!
//! Projects are grouped into named release groups in `convoy.toml`; one run
//! walks the selected groups in order and hands each group's publishable
//! projects to an execution engine as a single dispatch. The library surface
//! exists for embedders: build a [`core::context::WorkspaceContext`], assemble
//! [`release::PublishArgs`], and call [`release::publish`] (raises on any
//! failed group) or [`release::publish_with`] (returns the aggregate status).

pub mod commands;
pub mod core;
pub mod graph;
pub mod release;
pub mod ui;

pub use crate::core::config::{ConvoyConfig, ReleaseGroup, ResolvedConfig};
pub use crate::core::context::WorkspaceContext;
pub use crate::core::env::ExecEnv;
pub use crate::core::error::{ConvoyError, ConvoyResult, ExitCode};
pub use crate::graph::{ProjectGraph, ProjectNode};
