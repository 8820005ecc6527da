//! Convoy configuration (convoy.toml) parsing, validation and resolution
//!
//! Release groups are declared in `convoy.toml` at the workspace root. A group is
//! a named collection of workspace projects that are published together in one
//! orchestrated pass (the publish invocations are still issued per project).
//!
//! # Example convoy.toml
//!
//! ```toml
//! [workspace]
//! root = "."
//!
//! [publish]
//! load_dot_env = true
//!
//! [[groups]]
//! name = "core"
//! projects = ["lib-core", "lib-util"]
//!
//! [[groups]]
//! name = "tools"
//! projects = ["cli"]
//! ```
//!
//! Raw config is resolved against the project graph before any dispatch:
//! resolution validates the group definitions and synthesizes the implicit
//! `default` group (every workspace member) when no groups are declared.

use crate::core::error::{ConfigError, ConvoyError, ConvoyResult, ResultExt};
use crate::graph::ProjectGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the implicit release group synthesized when no groups are configured.
pub const DEFAULT_GROUP: &str = "default";

/// Configuration for cargo-convoy
/// Searched in order: convoy.toml, .convoy.toml, .config/convoy.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvoyConfig {
  pub workspace: WorkspaceConfig,
  #[serde(default)]
  pub publish: PublishConfig,
  #[serde(default)]
  pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
  pub root: PathBuf,
}

/// Defaults applied to every publish dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
  /// Load `.env` from the workspace root into dispatched process environments
  #[serde(default = "default_load_dot_env")]
  pub load_dot_env: bool,
}

fn default_load_dot_env() -> bool {
  true
}

impl Default for PublishConfig {
  fn default() -> Self {
    Self {
      load_dot_env: default_load_dot_env(),
    }
  }
}

/// A declared release group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
  /// Unique name for this release group
  pub name: String,

  /// Workspace projects published together under this group
  pub projects: Vec<String>,
}

/// A release group resolved against the project graph.
///
/// Membership is immutable input for the rest of the run: the filter and the
/// dispatcher never add or remove members, only narrow the set acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseGroup {
  pub name: String,
  pub projects: Vec<String>,
}

/// The resolved, validated release-group configuration for one run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
  /// Groups in declaration order
  pub groups: Vec<ReleaseGroup>,
}

impl ResolvedConfig {
  /// All group names in declaration order
  pub fn group_names(&self) -> Vec<String> {
    self.groups.iter().map(|g| g.name.clone()).collect()
  }

  /// All member projects across all groups, in group order
  pub fn all_projects(&self) -> Vec<String> {
    self.groups.iter().flat_map(|g| g.projects.iter().cloned()).collect()
  }
}

impl ConvoyConfig {
  /// Find config file in search order: convoy.toml, .convoy.toml, .config/convoy.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("convoy.toml"),
      path.join(".convoy.toml"),
      path.join(".config").join("convoy.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from convoy.toml (searches multiple locations)
  pub fn load(path: &Path) -> ConvoyResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ConvoyError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ConvoyConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    Ok(config)
  }

  /// Save config to convoy.toml (default location)
  pub fn save(&self, path: &Path) -> ConvoyResult<()> {
    let config_path = path.join("convoy.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content)
      .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Create a new empty config
  pub fn new(workspace_root: PathBuf) -> Self {
    Self {
      workspace: WorkspaceConfig { root: workspace_root },
      publish: PublishConfig::default(),
      groups: Vec::new(),
    }
  }

  /// Resolve and validate the declared groups against the project graph.
  ///
  /// Rules:
  /// - group names must be unique and non-empty
  /// - every listed project must be a workspace member
  /// - a project may belong to at most one group
  /// - with no `[[groups]]` declared, a single implicit group named `default`
  ///   containing every workspace member is synthesized
  ///
  /// Any violation is a fatal configuration error: the orchestrator must not
  /// guess a selection to publish.
  pub fn resolve(&self, graph: &ProjectGraph) -> ConvoyResult<ResolvedConfig> {
    if self.groups.is_empty() {
      return Ok(ResolvedConfig {
        groups: vec![ReleaseGroup {
          name: DEFAULT_GROUP.to_string(),
          projects: graph.project_names(),
        }],
      });
    }

    let mut seen_groups: BTreeMap<&str, ()> = BTreeMap::new();
    let mut owner_of: BTreeMap<&str, &str> = BTreeMap::new();
    let mut groups = Vec::with_capacity(self.groups.len());

    for group in &self.groups {
      if group.name.trim().is_empty() {
        return Err(ConvoyError::Config(ConfigError::MissingField {
          field: "groups.name".to_string(),
        }));
      }

      if seen_groups.insert(group.name.as_str(), ()).is_some() {
        return Err(ConvoyError::Config(ConfigError::Invalid {
          reason: format!("release group '{}' is declared more than once", group.name),
        }));
      }

      if group.projects.is_empty() {
        return Err(ConvoyError::Config(ConfigError::Invalid {
          reason: format!("release group '{}' has no projects", group.name),
        }));
      }

      for project in &group.projects {
        if graph.project(project).is_none() {
          return Err(ConvoyError::Config(ConfigError::Invalid {
            reason: format!(
              "release group '{}' lists unknown project '{}'. Workspace projects: {}",
              group.name,
              project,
              graph.project_names().join(", ")
            ),
          }));
        }

        if let Some(owner) = owner_of.insert(project.as_str(), group.name.as_str()) {
          return Err(ConvoyError::Config(ConfigError::Invalid {
            reason: format!(
              "project '{}' belongs to both release group '{}' and '{}'",
              project, owner, group.name
            ),
          }));
        }
      }

      groups.push(ReleaseGroup {
        name: group.name.clone(),
        projects: group.projects.clone(),
      });
    }

    Ok(ResolvedConfig { groups })
  }
}
