//! Publish-target eligibility for a candidate project set
//!
//! Only projects that declare the well-known publish target can be dispatched.
//! An entirely ineligible group is a hard stop for the run: the error names
//! every considered project so the user can see exactly what was skipped and
//! why. A partially eligible group proceeds silently with the eligible subset.

use crate::core::error::{ConvoyError, ConvoyResult, EligibilityError};
use crate::graph::ProjectGraph;
use crate::release::RELEASE_PUBLISH_TARGET;

/// Partition of a candidate set into dispatchable and dropped projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilitySplit {
  /// Projects declaring the publish target, in candidate order
  pub eligible: Vec<String>,

  /// Candidates dropped from this dispatch (no publish target declared)
  pub skipped: Vec<String>,
}

/// Partition a group's candidate projects by publish-target eligibility.
///
/// # Errors
/// Fails when no candidate is eligible; the error enumerates every considered
/// project by name. Dispatch for the group must not proceed past this.
pub fn check_publish_eligibility(
  graph: &ProjectGraph,
  group: &str,
  candidates: &[String],
) -> ConvoyResult<EligibilitySplit> {
  let mut eligible = Vec::new();
  let mut skipped = Vec::new();

  for name in candidates {
    if graph.has_target(name, RELEASE_PUBLISH_TARGET) {
      eligible.push(name.clone());
    } else {
      skipped.push(name.clone());
    }
  }

  if eligible.is_empty() {
    return Err(ConvoyError::Eligibility(EligibilityError::NoEligibleProjects {
      group: group.to_string(),
      target: RELEASE_PUBLISH_TARGET.to_string(),
      considered: candidates.to_vec(),
    }));
  }

  Ok(EligibilitySplit { eligible, skipped })
}
