//! Release group and project selection
//!
//! Turns the user's filters into the ordered set of groups to dispatch and, per
//! group, the subset of member projects to act on:
//!
//! - `--groups` narrows which release groups participate (full membership)
//! - positional project names narrow which members are acted on, within the
//!   candidate groups
//! - with neither, every project of every group is selected (an explicit
//!   branch, not a fallthrough of optional-argument absence)
//!
//! Any unknown name is a fatal filter error; the orchestrator must not guess.
//! A narrowed selection also flips `filtered`, which instructs the execution
//! engine to exclude task dependencies; otherwise a narrowed publish could
//! transitively re-publish projects outside the requested set.

use crate::core::config::{ReleaseGroup, ResolvedConfig};
use crate::core::error::{ConvoyError, ConvoyResult, FilterError};
use std::collections::{BTreeSet, HashMap};

/// The outcome of group/project selection for one run.
#[derive(Debug, Clone)]
pub struct FilteredGroups {
  /// Participating groups, in configuration order
  pub groups: Vec<ReleaseGroup>,

  /// Per-group subset of member projects to act on
  projects_by_group: HashMap<String, BTreeSet<String>>,

  /// Whether any user filter narrowed the selection
  pub filtered: bool,
}

impl FilteredGroups {
  /// The projects selected for a group, in deterministic order.
  pub fn projects_for(&self, group: &str) -> Vec<String> {
    self
      .projects_by_group
      .get(group)
      .map(|set| set.iter().cloned().collect())
      .unwrap_or_default()
  }
}

/// Select release groups and per-group project subsets for this run.
pub fn filter_groups(
  config: &ResolvedConfig,
  project_filter: &[String],
  group_filter: &[String],
) -> ConvoyResult<FilteredGroups> {
  // Groups filter first: narrow the candidate groups, keep config order
  let candidates: Vec<&ReleaseGroup> = if group_filter.is_empty() {
    config.groups.iter().collect()
  } else {
    let known: BTreeSet<&str> = config.groups.iter().map(|g| g.name.as_str()).collect();
    for name in group_filter {
      if !known.contains(name.as_str()) {
        return Err(ConvoyError::Filter(FilterError::UnknownGroup {
          name: name.clone(),
          available: config.group_names(),
        }));
      }
    }
    config
      .groups
      .iter()
      .filter(|g| group_filter.iter().any(|name| name == &g.name))
      .collect()
  };

  if project_filter.is_empty() {
    // Select-all branch: every project of every candidate group
    let projects_by_group = candidates
      .iter()
      .map(|g| (g.name.clone(), g.projects.iter().cloned().collect()))
      .collect();

    return Ok(FilteredGroups {
      groups: candidates.into_iter().cloned().collect(),
      projects_by_group,
      filtered: !group_filter.is_empty(),
    });
  }

  // Project filter: validate every requested name, then intersect per group
  let all_projects: BTreeSet<&str> = config
    .groups
    .iter()
    .flat_map(|g| g.projects.iter().map(String::as_str))
    .collect();

  for name in project_filter {
    if !all_projects.contains(name.as_str()) {
      return Err(ConvoyError::Filter(FilterError::UnknownProject {
        name: name.clone(),
        available: all_projects.iter().map(|s| s.to_string()).collect(),
      }));
    }

    let in_candidates = candidates
      .iter()
      .any(|g| g.projects.iter().any(|p| p == name));
    if !in_candidates {
      return Err(ConvoyError::Filter(FilterError::ProjectNotInGroups {
        name: name.clone(),
        groups: candidates.iter().map(|g| g.name.clone()).collect(),
      }));
    }
  }

  let requested: BTreeSet<&str> = project_filter.iter().map(String::as_str).collect();
  let mut groups = Vec::new();
  let mut projects_by_group = HashMap::new();

  for group in candidates {
    let selected: BTreeSet<String> = group
      .projects
      .iter()
      .filter(|p| requested.contains(p.as_str()))
      .cloned()
      .collect();

    // Groups with no matching projects drop out of the run entirely
    if selected.is_empty() {
      continue;
    }

    projects_by_group.insert(group.name.clone(), selected);
    groups.push(group.clone());
  }

  Ok(FilteredGroups {
    groups,
    projects_by_group,
    filtered: true,
  })
}
