//! Execution engine boundary and the process-spawning implementation
//!
//! The orchestrator hands the engine one `DispatchRequest` per release group and
//! interprets the returned `DispatchOutcome`; everything else about how tasks
//! run (ordering, parallelism, process spawning) belongs to the engine.
//!
//! `ProcessEngine` is the shipped implementation: it expands the task set with
//! workspace dependencies (unless the request excludes them), orders tasks into
//! dependency-first topological levels, and runs each level's `cargo publish`
//! invocations in parallel. A non-zero child exit is a per-task failure folded
//! into the group outcome; an unspawnable command is an engine error and aborts
//! the whole run.

use crate::core::env::ExecEnv;
use crate::core::error::{ConvoyError, ConvoyResult, ResultExt};
use crate::graph::ProjectGraph;
use crate::release::RELEASE_PUBLISH_TARGET;
use crate::release::overrides::OverrideSet;
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// How dispatched task output is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
  /// Capture task output, replay it only on failure
  #[default]
  Static,
  /// Stream task output directly to the terminal
  Stream,
}

/// Everything the engine needs for one group dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
  /// Eligible projects to act on
  pub projects: Vec<String>,

  /// Targets to run per project
  pub targets: Vec<String>,

  /// Open key/value overrides for the targets
  pub overrides: OverrideSet,

  pub output_style: OutputStyle,

  /// Do not pull task dependencies into the task set.
  /// Set when the user narrowed the selection, so a narrowed publish cannot
  /// transitively re-publish projects outside the requested set.
  pub exclude_task_dependencies: bool,

  /// Load `.env` from the workspace root into dispatched process environments
  pub load_dot_env_files: bool,
}

/// Outcome of one group dispatch.
///
/// `Failure` carries the raw status reported by the engine; `Failure(0)` is a
/// failed dispatch whose process died without a distinguishing code and is
/// coerced to 1 by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
  Success,
  Failure(i32),
}

impl DispatchOutcome {
  /// Classify a raw process exit status
  pub fn from_exit_status(status: i32) -> Self {
    if status == 0 {
      DispatchOutcome::Success
    } else {
      DispatchOutcome::Failure(status)
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, DispatchOutcome::Success)
  }
}

/// Boundary to the task-execution engine.
///
/// A returned `DispatchOutcome::Failure` is a recoverable per-group result;
/// a returned `Err` is an infrastructure problem that aborts the whole run.
pub trait ExecutionEngine {
  fn dispatch(&self, request: &DispatchRequest, graph: &ProjectGraph, env: &ExecEnv) -> ConvoyResult<DispatchOutcome>;
}

/// Process-spawning engine: runs publish targets as `cargo publish` children.
pub struct ProcessEngine {
  workspace_root: PathBuf,
}

impl ProcessEngine {
  pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
    Self {
      workspace_root: workspace_root.into(),
    }
  }

  /// Expand the requested projects with their transitive workspace
  /// dependencies that also declare the target, unless the request excludes
  /// task dependencies.
  fn task_set(&self, request: &DispatchRequest, graph: &ProjectGraph) -> ConvoyResult<BTreeSet<String>> {
    let mut tasks: BTreeSet<String> = request.projects.iter().cloned().collect();

    if request.exclude_task_dependencies {
      return Ok(tasks);
    }

    for project in &request.projects {
      for dep in graph.transitive_dependencies(project)? {
        let declares_all = request.targets.iter().all(|t| graph.has_target(&dep, t));
        if declares_all {
          tasks.insert(dep);
        }
      }
    }

    Ok(tasks)
  }

  /// Environment variables for every dispatched child:
  /// cross-cutting flags, `.env` entries (when requested) and the raw
  /// overrides as `CONVOY_OVERRIDE_*`.
  fn child_env(&self, request: &DispatchRequest, env: &ExecEnv) -> ConvoyResult<Vec<(String, String)>> {
    let mut vars: Vec<(String, String)> = env
      .vars()
      .into_iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();

    if request.load_dot_env_files {
      let dot_env = self.workspace_root.join(".env");
      if dot_env.exists() {
        for entry in dotenvy::from_path_iter(&dot_env)
          .map_err(|e| ConvoyError::message(format!("Failed to load {}: {}", dot_env.display(), e)))?
        {
          let (key, value) =
            entry.map_err(|e| ConvoyError::message(format!("Failed to parse {}: {}", dot_env.display(), e)))?;
          vars.push((key, value));
        }
      }
    }

    for (key, value) in request.overrides.iter() {
      vars.push((override_env_key(key), value.to_string()));
    }

    Ok(vars)
  }

  /// Run one task. `None` is success; `Some(code)` is a failure, with code 0
  /// standing in for a child that died without reporting one.
  fn run_task(
    &self,
    project: &str,
    target: &str,
    request: &DispatchRequest,
    graph: &ProjectGraph,
    env: &ExecEnv,
    child_env: &[(String, String)],
  ) -> ConvoyResult<Option<i32>> {
    let node = graph
      .project(project)
      .ok_or_else(|| ConvoyError::message(format!("Project '{}' disappeared from the graph", project)))?;

    let args = publish_args(&node.manifest_path, &request.overrides, env, target)?;

    if env.verbose() {
      println!(
        "   [{}] {} → cargo {}",
        chrono::Utc::now().format("%H:%M:%S"),
        project,
        args.join(" ")
      );
    }

    let mut cmd = Command::new("cargo");
    cmd.current_dir(&self.workspace_root).args(&args);
    for (key, value) in child_env {
      cmd.env(key, value);
    }

    let status = match request.output_style {
      OutputStyle::Stream => cmd
        .status()
        .with_context(|| format!("Failed to run cargo for project '{}'", project))?,
      OutputStyle::Static => {
        let output = cmd
          .output()
          .with_context(|| format!("Failed to run cargo for project '{}'", project))?;
        if !output.status.success() {
          eprintln!("❌ {} failed:", project);
          eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        }
        output.status
      }
    };

    if status.success() {
      Ok(None)
    } else {
      Ok(Some(status.code().unwrap_or(0)))
    }
  }
}

impl ExecutionEngine for ProcessEngine {
  fn dispatch(&self, request: &DispatchRequest, graph: &ProjectGraph, env: &ExecEnv) -> ConvoyResult<DispatchOutcome> {
    let tasks = self.task_set(request, graph)?;
    let levels = graph.topological_levels(&tasks)?;
    let child_env = self.child_env(request, env)?;

    let total = tasks.len() * request.targets.len();
    let progress = MultiProgress::new();
    let bar = progress.add_bar(total, "publishing".to_string());

    let mut failed: Option<i32> = None;

    // Levels run sequentially (dependencies first); tasks within a level in parallel
    'levels: for level in levels {
      let results: Vec<ConvoyResult<(String, Option<i32>)>> = level
        .par_iter()
        .flat_map(|project| {
          request.targets.par_iter().map(move |target| (project, target))
        })
        .map(|(project, target)| {
          let status = self.run_task(project, target, request, graph, env, &child_env)?;
          progress.inc(&bar);
          Ok((project.clone(), status))
        })
        .collect();

      for result in results {
        let (project, status) = result?;
        if let Some(code) = status {
          eprintln!("❌ Publish failed for {} (exit {})", project, code);
          failed.get_or_insert(code);
        }
      }

      if failed.is_some() {
        // Dependents of a failed level would publish against missing versions
        break 'levels;
      }
    }

    match failed {
      Some(status) => Ok(DispatchOutcome::Failure(status)),
      None => Ok(DispatchOutcome::Success),
    }
  }
}

/// Translate an override key to its child-environment variable name.
fn override_env_key(key: &str) -> String {
  format!("CONVOY_OVERRIDE_{}", key.replace('-', "_").to_uppercase())
}

/// Build the cargo argument vector for one publish task.
///
/// The `registry` override becomes `--registry`; a truthy `dry-run` override or
/// the context dry-run indicator becomes `--dry-run`. All other overrides reach
/// the child through its environment, not the command line.
fn publish_args(
  manifest_path: &Path,
  overrides: &OverrideSet,
  env: &ExecEnv,
  target: &str,
) -> ConvoyResult<Vec<String>> {
  if target != RELEASE_PUBLISH_TARGET {
    return Err(ConvoyError::message(format!(
      "The process engine only knows how to run the '{}' target (got '{}')",
      RELEASE_PUBLISH_TARGET, target
    )));
  }

  let mut args = vec![
    "publish".to_string(),
    "--manifest-path".to_string(),
    manifest_path.display().to_string(),
  ];

  if let Some(registry) = overrides.get_str("registry") {
    args.push("--registry".to_string());
    args.push(registry.to_string());
  }

  if overrides.is_truthy("dry-run") || env.dry_run() {
    args.push("--dry-run".to_string());
  }

  Ok(args)
}
