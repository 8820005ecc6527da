//! Test helpers for integration tests

use cargo_convoy::core::config::{ConvoyConfig, GroupConfig, PublishConfig, WorkspaceConfig};
use cargo_convoy::core::context::WorkspaceContext;
use cargo_convoy::core::env::ExecEnv;
use cargo_convoy::core::error::{ConvoyError, ConvoyResult};
use cargo_convoy::graph::ProjectGraph;
use cargo_convoy::release::engine::{DispatchOutcome, DispatchRequest, ExecutionEngine};
use cargo_convoy::release::preview::{GraphRenderer, RenderRequest};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Build a graph from `(name, deps, has publish target)` triples.
pub fn graph(projects: &[(&str, &[&str], bool)]) -> ProjectGraph {
  ProjectGraph::from_projects(
    projects
      .iter()
      .map(|(name, deps, publishable)| {
        let targets = if *publishable {
          vec!["nx-release-publish", "build"]
        } else {
          vec!["build"]
        };
        (*name, deps.to_vec(), targets)
      })
      .collect(),
  )
}

/// Build a convoy config with the given `(group, members)` entries.
pub fn config(groups: &[(&str, &[&str])]) -> ConvoyConfig {
  ConvoyConfig {
    workspace: WorkspaceConfig {
      root: PathBuf::from("."),
    },
    publish: PublishConfig::default(),
    groups: groups
      .iter()
      .map(|(name, projects)| GroupConfig {
        name: name.to_string(),
        projects: projects.iter().map(|p| p.to_string()).collect(),
      })
      .collect(),
  }
}

/// Assemble a workspace context from an in-memory graph and config.
pub fn context(graph: ProjectGraph, config: ConvoyConfig) -> WorkspaceContext {
  WorkspaceContext {
    root: PathBuf::from("."),
    graph: Arc::new(graph),
    config: Some(Arc::new(config)),
  }
}

/// One dispatch the scripted engine saw: the request plus the env flags
/// in effect at dispatch time.
#[derive(Debug, Clone)]
pub struct SeenDispatch {
  pub request: DispatchRequest,
  pub env: ExecEnv,
}

/// Execution engine double: records every dispatch and replays scripted
/// outcomes (defaulting to success once the script runs dry).
#[derive(Default)]
pub struct ScriptedEngine {
  seen: Mutex<Vec<SeenDispatch>>,
  outcomes: Mutex<VecDeque<DispatchOutcome>>,
  fail_with_error: bool,
}

impl ScriptedEngine {
  pub fn new() -> Self {
    Self::default()
  }

  /// Script the outcomes of the next dispatches, in order.
  pub fn with_outcomes(outcomes: &[DispatchOutcome]) -> Self {
    Self {
      seen: Mutex::new(Vec::new()),
      outcomes: Mutex::new(outcomes.iter().copied().collect()),
      fail_with_error: false,
    }
  }

  /// An engine whose dispatch fails with an infrastructure error.
  pub fn broken() -> Self {
    Self {
      fail_with_error: true,
      ..Self::default()
    }
  }

  pub fn dispatches(&self) -> Vec<SeenDispatch> {
    self.seen.lock().unwrap().clone()
  }

  pub fn dispatch_count(&self) -> usize {
    self.seen.lock().unwrap().len()
  }
}

impl ExecutionEngine for ScriptedEngine {
  fn dispatch(&self, request: &DispatchRequest, _graph: &ProjectGraph, env: &ExecEnv) -> ConvoyResult<DispatchOutcome> {
    if self.fail_with_error {
      return Err(ConvoyError::message("engine exploded"));
    }

    self.seen.lock().unwrap().push(SeenDispatch {
      request: request.clone(),
      env: env.clone(),
    });

    let outcome = self
      .outcomes
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(DispatchOutcome::Success);
    Ok(outcome)
  }
}

/// Renderer double recording every render request.
#[derive(Default)]
pub struct RecordingRenderer {
  seen: Mutex<Vec<RenderRequest>>,
}

impl RecordingRenderer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn renders(&self) -> Vec<RenderRequest> {
    self.seen.lock().unwrap().clone()
  }
}

impl GraphRenderer for RecordingRenderer {
  fn render(&self, request: &RenderRequest, _graph: &ProjectGraph) -> ConvoyResult<()> {
    self.seen.lock().unwrap().push(request.clone());
    Ok(())
  }
}
