//! `cargo convoy status` - Show release groups and publish eligibility
//!
//! Lists the resolved release groups in configuration order, each member
//! project, and whether it declares the publish target.

use crate::core::context::WorkspaceContext;
use crate::core::error::ConvoyResult;
use crate::release::RELEASE_PUBLISH_TARGET;
use serde::Serialize;

/// Status of a single project within a release group
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatus {
  pub name: String,
  pub version: Option<String>,
  pub publishable: bool,
}

/// Status of a release group
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatus {
  pub name: String,
  pub projects: Vec<ProjectStatus>,
}

/// Run the status command
pub fn run_status(ctx: &WorkspaceContext, json: bool) -> ConvoyResult<()> {
  let config = ctx.require_config()?;
  let resolved = config.resolve(&ctx.graph)?;

  let statuses: Vec<GroupStatus> = resolved
    .groups
    .iter()
    .map(|group| GroupStatus {
      name: group.name.clone(),
      projects: group
        .projects
        .iter()
        .map(|name| ProjectStatus {
          name: name.clone(),
          version: ctx.graph.project(name).map(|p| p.version.to_string()),
          publishable: ctx.graph.has_target(name, RELEASE_PUBLISH_TARGET),
        })
        .collect(),
    })
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&statuses)?);
  } else {
    print_status_table(&statuses);
  }

  Ok(())
}

/// Print group status as a formatted table
fn print_status_table(statuses: &[GroupStatus]) {
  println!("\n🚚 Release Groups\n");

  for group in statuses {
    let publishable = group.projects.iter().filter(|p| p.publishable).count();
    println!("{} ({}/{} publishable)", group.name, publishable, group.projects.len());

    for project in &group.projects {
      let mark = if project.publishable { "✅" } else { "— " };
      let version = project.version.as_deref().unwrap_or("?");
      println!("  {} {:<24} v{}", mark, project.name, version);
    }
    println!();
  }
}
