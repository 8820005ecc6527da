//! Execution environment flags threaded through every collaborator call
//!
//! Dry-run and verbose are cross-cutting: the execution engine and anything it
//! transitively spawns must observe the same semantics the orchestrator decided
//! on. Instead of ambient process globals, the flags live in an explicit `ExecEnv`
//! passed into each dispatch, and the engine materializes them as environment
//! variables on every child process. Flags are write-only for the lifetime of a
//! run: once set they are never cleared or read back by the orchestrator.

/// Environment variable observed by dispatched processes when a dry run is active.
pub const DRY_RUN_ENV: &str = "CONVOY_DRY_RUN";

/// Environment variable observed by dispatched processes when verbose logging is on.
pub const VERBOSE_ENV: &str = "CONVOY_VERBOSE";

/// Cross-cutting execution flags for one orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecEnv {
  dry_run: bool,
  verbose: bool,
}

impl ExecEnv {
  pub fn new() -> Self {
    Self::default()
  }

  /// Turn on the dry-run indicator. There is no way to turn it back off.
  pub fn set_dry_run(&mut self) {
    self.dry_run = true;
  }

  /// Turn on the verbose indicator. There is no way to turn it back off.
  pub fn set_verbose(&mut self) {
    self.verbose = true;
  }

  pub fn dry_run(&self) -> bool {
    self.dry_run
  }

  pub fn verbose(&self) -> bool {
    self.verbose
  }

  /// Environment variables to set on every dispatched process.
  ///
  /// Only active flags produce a variable; an absent flag must not inject a
  /// falsy value into child environments.
  pub fn vars(&self) -> Vec<(&'static str, &'static str)> {
    let mut vars = Vec::new();
    if self.dry_run {
      vars.push((DRY_RUN_ENV, "true"));
    }
    if self.verbose {
      vars.push((VERBOSE_ENV, "true"));
    }
    vars
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_vars_only_for_active_flags() {
    let mut env = ExecEnv::new();
    assert!(env.vars().is_empty());

    env.set_dry_run();
    assert_eq!(env.vars(), vec![(DRY_RUN_ENV, "true")]);

    env.set_verbose();
    assert_eq!(env.vars(), vec![(DRY_RUN_ENV, "true"), (VERBOSE_ENV, "true")]);
  }

  #[test]
  fn test_setting_twice_is_idempotent() {
    let mut env = ExecEnv::new();
    env.set_verbose();
    env.set_verbose();
    assert!(env.verbose());
    assert_eq!(env.vars().len(), 1);
  }
}
