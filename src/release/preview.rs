//! Graph preview bypass for publish dispatches
//!
//! When a preview is requested, the group's dispatch is replaced by a
//! visualization call over the same selected task set and target list; no
//! publish action is taken and the group contributes a success to the run.
//!
//! The render request is fixed: non-watching, not-all, auto-open, task-level
//! view, over the selected projects and targets, into a destination file
//! computed from the request (an explicit file wins; otherwise a digest-named
//! file under `.convoy/`).

use crate::core::error::{ConvoyResult, ResultExt};
use crate::graph::ProjectGraph;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// What the renderer visualizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphView {
  /// Individual tasks (project × target)
  Tasks,
  /// Whole projects
  Projects,
}

/// One visualization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
  /// Keep watching and re-rendering on change
  pub watch: bool,
  /// Render the whole workspace instead of the selection
  pub all: bool,
  /// Open the rendered output when the renderer supports it
  pub open: bool,
  pub view: GraphView,
  pub targets: Vec<String>,
  pub projects: Vec<String>,
  pub file: PathBuf,
}

/// Boundary to the visualization collaborator.
pub trait GraphRenderer {
  fn render(&self, request: &RenderRequest, graph: &ProjectGraph) -> ConvoyResult<()>;
}

/// Compute the preview destination for a selection.
///
/// An explicitly requested file wins. Otherwise the file is named by a short
/// digest of the selected projects and targets, so the same selection maps to
/// the same file across runs.
pub fn preview_file(explicit: Option<&Path>, projects: &[String], targets: &[String]) -> PathBuf {
  if let Some(file) = explicit {
    return file.to_path_buf();
  }

  let mut hasher = Sha256::new();
  for project in projects {
    hasher.update(project.as_bytes());
    hasher.update([0]);
  }
  for target in targets {
    hasher.update(target.as_bytes());
    hasher.update([0]);
  }
  let digest = format!("{:x}", hasher.finalize());

  PathBuf::from(".convoy").join(format!("task-graph-{}.dot", &digest[..12]))
}

/// Render the preview for one group's eligible projects.
///
/// This path is mutually exclusive with real dispatch for the group: the
/// execution engine is never consulted.
pub fn render_preview(
  renderer: &dyn GraphRenderer,
  graph: &ProjectGraph,
  projects: &[String],
  targets: &[String],
  explicit_file: Option<&Path>,
) -> ConvoyResult<()> {
  let request = RenderRequest {
    watch: false,
    all: false,
    open: true,
    view: GraphView::Tasks,
    targets: targets.to_vec(),
    projects: projects.to_vec(),
    file: preview_file(explicit_file, projects, targets),
  };

  renderer.render(&request, graph)
}

/// Renderer writing the selected task subgraph as Graphviz DOT.
///
/// DOT output has nothing sensible to auto-open, so `open` is advisory here;
/// the destination is printed instead.
pub struct DotRenderer;

impl GraphRenderer for DotRenderer {
  fn render(&self, request: &RenderRequest, graph: &ProjectGraph) -> ConvoyResult<()> {
    let dot = graph.to_dot(&request.projects, &request.targets);

    if let Some(parent) = request.file.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(&request.file, dot).with_context(|| format!("Failed to write {}", request.file.display()))?;

    println!("📈 Task graph written to {}", request.file.display());
    println!("   Render it with: dot -Tsvg {} -o graph.svg", request.file.display());

    Ok(())
  }
}
