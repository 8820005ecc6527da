//! Publish dispatcher: the per-group control loop and outcome aggregation
//!
//! One run walks the filtered release groups strictly in order. Per group it
//! builds the override set, gates on publish-target eligibility, then either
//! renders the graph preview (and moves on) or dispatches to the execution
//! engine and folds the outcome into the run-wide status.
//!
//! Two result channels, deliberately kept apart:
//! - configuration, filter and eligibility problems are fatal: they propagate
//!   as errors immediately and stop the whole run;
//! - a group's non-zero dispatch outcome is recorded and iteration continues,
//!   so remaining groups still get their publish attempt.

use crate::core::context::WorkspaceContext;
use crate::core::env::ExecEnv;
use crate::core::error::{ConvoyError, ConvoyResult};
use crate::release::RELEASE_PUBLISH_TARGET;
use crate::release::eligibility::check_publish_eligibility;
use crate::release::engine::{DispatchOutcome, DispatchRequest, ExecutionEngine, OutputStyle};
use crate::release::filter::filter_groups;
use crate::release::overrides::{PublishFlags, build_publish_overrides};
use crate::release::preview::{GraphRenderer, render_preview};
use std::path::PathBuf;

/// Arguments for one publish run, assembled by the CLI or a programmatic caller.
#[derive(Debug, Clone, Default)]
pub struct PublishArgs {
  /// Narrow the run to these projects (within the selected groups)
  pub projects: Vec<String>,

  /// Narrow the run to these release groups
  pub groups: Vec<String>,

  pub registry: Option<String>,
  pub tag: Option<String>,
  pub otp: Option<String>,
  pub dry_run: bool,
  pub first_release: bool,
  pub verbose: bool,

  /// Render the task graph instead of publishing
  pub graph: bool,
  /// Explicit preview destination (with `graph`)
  pub graph_file: Option<PathBuf>,

  pub output_style: OutputStyle,

  /// Raw override tokens passed after `--`, forwarded to the engine
  pub overrides_unparsed: Vec<String>,
}

impl PublishArgs {
  fn flags(&self) -> PublishFlags {
    PublishFlags {
      registry: self.registry.clone(),
      tag: self.tag.clone(),
      otp: self.otp.clone(),
      dry_run: self.dry_run,
      first_release: self.first_release,
      verbose: self.verbose,
    }
  }
}

/// Run-wide exit status folded from per-group dispatch outcomes.
///
/// Starts at 0. Each failure overwrites the stored code with its own (or with 1
/// when the failure carries code 0); a later success never clears a recorded
/// failure. Overwrite, not maximize: when several groups fail, the *last*
/// failure's code is what the process exits with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverallStatus {
  status: i32,
}

impl OverallStatus {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fold one group's dispatch outcome into the run-wide status.
  pub fn record(&mut self, outcome: DispatchOutcome) {
    if let DispatchOutcome::Failure(code) = outcome {
      self.status = if code != 0 { code } else { 1 };
    }
  }

  pub fn code(&self) -> i32 {
    self.status
  }

  pub fn is_success(&self) -> bool {
    self.status == 0
  }
}

/// Run the publish orchestration and return the aggregate exit status.
///
/// This is the CLI-facing entry point: a non-zero return is the process exit
/// code, emitted without an extra diagnostic (the engine already reported the
/// per-task failures). Fatal problems (bad config, bad filter, an entirely
/// ineligible group, an engine infrastructure error) return `Err` instead and
/// abort the run where they occur.
pub fn publish_with(
  ctx: &WorkspaceContext,
  args: &PublishArgs,
  engine: &dyn ExecutionEngine,
  renderer: &dyn GraphRenderer,
) -> ConvoyResult<i32> {
  let config = ctx.require_config()?;
  let resolved = config.resolve(&ctx.graph)?;
  let filtered = filter_groups(&resolved, &args.projects, &args.groups)?;

  let mut env = ExecEnv::new();
  if args.verbose {
    env.set_verbose();
  }

  let targets = vec![RELEASE_PUBLISH_TARGET.to_string()];
  let flags = args.flags();
  let mut overall = OverallStatus::new();

  for group in &filtered.groups {
    let candidates = filtered.projects_for(&group.name);

    let overrides = build_publish_overrides(&args.overrides_unparsed, &flags, &mut env);
    let split = check_publish_eligibility(&ctx.graph, &group.name, &candidates)?;

    if args.graph {
      // Preview replaces dispatch for this group; it contributes a success
      // without touching the aggregator
      render_preview(renderer, &ctx.graph, &split.eligible, &targets, args.graph_file.as_deref())?;
      continue;
    }

    println!("🚚 Release group '{}': {} project(s)", group.name, split.eligible.len());
    if env.verbose() {
      println!(
        "   [{}] dispatching: {}",
        chrono::Utc::now().format("%H:%M:%S"),
        split.eligible.join(", ")
      );
    }

    let request = DispatchRequest {
      projects: split.eligible,
      targets: targets.clone(),
      overrides,
      output_style: args.output_style,
      exclude_task_dependencies: filtered.filtered,
      load_dot_env_files: config.publish.load_dot_env,
    };

    let outcome = engine.dispatch(&request, &ctx.graph, &env)?;
    overall.record(outcome);
  }

  Ok(overall.code())
}

/// Programmatic entry point: resolves on full success, raises otherwise.
///
/// Where the CLI returns the aggregate status for the caller to exit with,
/// embedders get a `PublishFailed` error carrying it, never a silently
/// swallowed non-zero status.
pub fn publish(
  ctx: &WorkspaceContext,
  args: &PublishArgs,
  engine: &dyn ExecutionEngine,
  renderer: &dyn GraphRenderer,
) -> ConvoyResult<()> {
  let status = publish_with(ctx, args, engine, renderer)?;
  if status != 0 {
    return Err(ConvoyError::PublishFailed { status });
  }
  Ok(())
}
