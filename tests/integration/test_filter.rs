//! Integration tests for release-group selection and config resolution

use crate::helpers::{config, graph};
use cargo_convoy::core::error::{ConvoyError, FilterError};
use cargo_convoy::release::filter_groups;

fn resolved() -> cargo_convoy::core::config::ResolvedConfig {
  let graph = graph(&[
    ("lib-core", &[], true),
    ("lib-util", &["lib-core"], true),
    ("cli", &["lib-util"], true),
    ("docs", &[], false),
  ]);
  config(&[("core", &["lib-core", "lib-util"]), ("tools", &["cli", "docs"])])
    .resolve(&graph)
    .unwrap()
}

#[test]
fn no_filter_selects_every_project_of_every_group() {
  let filtered = filter_groups(&resolved(), &[], &[]).unwrap();

  assert_eq!(filtered.groups.len(), 2);
  assert!(!filtered.filtered);
  assert_eq!(filtered.projects_for("core"), vec!["lib-core", "lib-util"]);
  assert_eq!(filtered.projects_for("tools"), vec!["cli", "docs"]);
}

#[test]
fn group_filter_preserves_config_order() {
  let filtered = filter_groups(
    &resolved(),
    &[],
    &["tools".to_string(), "core".to_string()],
  )
  .unwrap();

  // Config order wins over the order the user listed the groups in
  let names: Vec<_> = filtered.groups.iter().map(|g| g.name.as_str()).collect();
  assert_eq!(names, vec!["core", "tools"]);
  assert!(filtered.filtered);
}

#[test]
fn project_filter_drops_groups_without_matches() {
  let filtered = filter_groups(&resolved(), &["cli".to_string()], &[]).unwrap();

  assert_eq!(filtered.groups.len(), 1);
  assert_eq!(filtered.groups[0].name, "tools");
  assert_eq!(filtered.projects_for("tools"), vec!["cli"]);
}

#[test]
fn unknown_names_are_filter_errors() {
  let err = filter_groups(&resolved(), &["ghost".to_string()], &[]).unwrap_err();
  assert!(matches!(err, ConvoyError::Filter(FilterError::UnknownProject { .. })));

  let err = filter_groups(&resolved(), &[], &["ghost".to_string()]).unwrap_err();
  assert!(matches!(err, ConvoyError::Filter(FilterError::UnknownGroup { .. })));
}

#[test]
fn resolution_synthesizes_default_group_when_unconfigured() {
  let graph = graph(&[("solo", &[], true)]);
  let resolved = config(&[]).resolve(&graph).unwrap();

  assert_eq!(resolved.groups.len(), 1);
  assert_eq!(resolved.groups[0].name, "default");
  assert_eq!(resolved.groups[0].projects, vec!["solo"]);
}

#[test]
fn resolution_rejects_unknown_projects() {
  let graph = graph(&[("solo", &[], true)]);
  let err = config(&[("core", &["ghost"])]).resolve(&graph).unwrap_err();

  assert!(matches!(err, ConvoyError::Config(_)));
  assert_eq!(err.exit_code(), 1);
}
