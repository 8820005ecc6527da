//! Unified workspace context - build once, pass everywhere
//!
//! WorkspaceContext eliminates redundant metadata/config/graph loads by building
//! all workspace-level data once in main.rs, then passing by reference to every
//! command. Commands that require convoy.toml call `require_config()` and fail
//! with a configuration error before touching the execution engine.

use crate::core::config::ConvoyConfig;
use crate::core::error::{ConvoyError, ConvoyResult};
use crate::graph::ProjectGraph;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Unified workspace context containing all shared workspace-level data.
///
/// Uses Arc for efficient sharing of graph data without expensive clones.
#[derive(Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory (absolute path)
  pub root: PathBuf,

  /// Project graph (workspace members, dependency edges, declared targets)
  pub graph: Arc<ProjectGraph>,

  /// Convoy configuration (convoy.toml)
  /// Optional because inspection commands can run without one
  pub config: Option<Arc<ConvoyConfig>>,
}

impl WorkspaceContext {
  /// Build workspace context from a root directory.
  ///
  /// Loads the project graph via cargo metadata and attempts to load
  /// convoy.toml. Config is optional - commands that require it should check
  /// and error.
  pub fn build(workspace_root: &Path) -> ConvoyResult<Self> {
    let root = workspace_root.to_path_buf();
    let graph = Arc::new(ProjectGraph::load(&root)?);
    let config = ConvoyConfig::load(&root).ok().map(Arc::new);

    Ok(Self { root, graph, config })
  }

  /// Get config or error if not found.
  pub fn require_config(&self) -> ConvoyResult<&Arc<ConvoyConfig>> {
    self.config.as_ref().ok_or_else(|| {
      ConvoyError::message("No convoy.toml found. Create one at the workspace root to define release groups.")
    })
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
