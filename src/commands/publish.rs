//! `cargo convoy publish` - Publish release groups through the execution engine
//!
//! Thin CLI wrapper around `release::publish`: wires the process engine and the
//! DOT renderer in, then returns the aggregate exit status for main to exit
//! with. A non-zero aggregate is returned without an extra diagnostic; the
//! engine already reported each failing task.

use crate::core::context::WorkspaceContext;
use crate::core::error::{ConvoyError, ConvoyResult};
use crate::release::engine::OutputStyle;
use crate::release::{DotRenderer, ProcessEngine, PublishArgs, publish_with};
use std::path::PathBuf;

/// Run the publish command. Returns the process exit status.
#[allow(clippy::too_many_arguments)]
pub fn run_publish(
  ctx: &WorkspaceContext,
  projects: Vec<String>,
  groups: Vec<String>,
  registry: Option<String>,
  tag: Option<String>,
  otp: Option<String>,
  dry_run: bool,
  first_release: bool,
  verbose: bool,
  graph: bool,
  graph_file: Option<PathBuf>,
  output_style: String,
  overrides: Vec<String>,
) -> ConvoyResult<i32> {
  let output_style = parse_output_style(&output_style)?;

  let args = PublishArgs {
    projects,
    groups,
    registry,
    tag,
    otp,
    dry_run,
    first_release,
    verbose,
    graph,
    graph_file,
    output_style,
    overrides_unparsed: overrides,
  };

  let engine = ProcessEngine::new(ctx.workspace_root());
  let renderer = DotRenderer;

  publish_with(ctx, &args, &engine, &renderer)
}

fn parse_output_style(s: &str) -> ConvoyResult<OutputStyle> {
  match s.to_lowercase().as_str() {
    "static" => Ok(OutputStyle::Static),
    "stream" => Ok(OutputStyle::Stream),
    _ => Err(ConvoyError::message(format!(
      "Unknown output style '{}'. Valid styles: static, stream",
      s
    ))),
  }
}
