//! CLI commands for cargo-convoy
//!
//! - **publish**: Publish release groups through the execution engine
//! - **status**: Show release groups, membership and publish eligibility
//!
//! All commands accept `&WorkspaceContext` to avoid redundant workspace loads.

pub mod publish;
pub mod status;

pub use publish::run_publish;
pub use status::run_status;
