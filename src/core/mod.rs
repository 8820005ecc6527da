//! Core building blocks for cargo-convoy
//!
//! - **config**: Convoy configuration (convoy.toml) parsing, validation and
//!   release-group resolution
//! - **context**: Unified workspace context for efficient data sharing across
//!   commands
//! - **env**: Cross-cutting execution flags (dry-run, verbose) threaded into
//!   every collaborator call
//! - **error**: Error types with contextual help messages and exit codes

pub mod config;
pub mod context;
pub mod env;
pub mod error;
