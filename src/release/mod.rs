//! Release-publish orchestration
//!
//! Publishing a workspace means walking its release groups in order and, per
//! group, handing the eligible projects to the execution engine as one
//! dispatch. This module owns everything between the user's arguments and that
//! hand-off:
//!
//! - **overrides**: per-dispatch key/value overrides, seeded from raw CLI
//!   tokens and patched with the named publish flags
//! - **filter**: release group and project selection (select-all, `--groups`,
//!   positional project names)
//! - **eligibility**: publish-target gating for a group's candidates
//! - **engine**: the execution-engine boundary and the process-spawning
//!   implementation
//! - **preview**: the graph-preview bypass and the renderer boundary
//! - **publish**: the per-group control loop and run-wide status aggregation
//!
//! # Core invariants
//!
//! 1. **Groups run strictly in order**: a later group never starts before the
//!    previous group's dispatch has fully resolved
//! 2. **Fatal vs. recoverable is explicit**: anything that prevents computing
//!    what to publish aborts the run; a group whose publish returned non-zero
//!    is recorded and the loop continues
//! 3. **A narrowed selection never publishes beyond itself**: project/group
//!    filters instruct the engine to exclude task dependencies

pub mod eligibility;
pub mod engine;
pub mod filter;
pub mod overrides;
pub mod preview;
pub mod publish;

/// Well-known target name a project must declare to be publishable.
///
/// Publish adapters register this exact identifier in project manifests; the
/// dispatcher and the eligibility check both key on it.
pub const RELEASE_PUBLISH_TARGET: &str = "nx-release-publish";

pub use eligibility::{EligibilitySplit, check_publish_eligibility};
pub use engine::{DispatchOutcome, DispatchRequest, ExecutionEngine, OutputStyle, ProcessEngine};
pub use filter::{FilteredGroups, filter_groups};
pub use overrides::{OverrideSet, OverrideValue, PublishFlags, build_publish_overrides};
pub use preview::{DotRenderer, GraphRenderer, GraphView, RenderRequest, render_preview};
pub use publish::{OverallStatus, PublishArgs, publish, publish_with};
