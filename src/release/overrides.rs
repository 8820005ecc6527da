//! Per-dispatch override construction
//!
//! Overrides are an open key/value mapping handed to the execution engine with
//! each dispatch. They are seeded from the raw tokens the user passed after `--`
//! and then patched with the named publish flags. Named flags always win over
//! anything the raw tokens already set for the same key; an absent flag never
//! injects a key.

use crate::core::env::ExecEnv;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single override value (string or boolean)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
  Bool(bool),
  Str(String),
}

impl OverrideValue {
  /// Truthiness: `false` and the empty string are falsy, everything else truthy
  pub fn is_truthy(&self) -> bool {
    match self {
      OverrideValue::Bool(b) => *b,
      OverrideValue::Str(s) => !s.is_empty(),
    }
  }
}

impl fmt::Display for OverrideValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OverrideValue::Bool(b) => write!(f, "{}", b),
      OverrideValue::Str(s) => write!(f, "{}", s),
    }
  }
}

/// An open key/value override mapping consumed by the execution engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSet {
  entries: BTreeMap<String, OverrideValue>,
}

impl OverrideSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed an override set from raw CLI tokens.
  ///
  /// Recognized forms, in order of appearance (later tokens win for a key):
  /// - `--key=value` / `key=value`: string value (`true`/`false` become booleans)
  /// - `--flag`: boolean true
  ///
  /// Unrecognizable tokens are ignored rather than rejected: they belong to the
  /// engine's own argument space, not ours.
  pub fn parse_tokens(tokens: &[String]) -> Self {
    let mut set = Self::new();

    for token in tokens {
      let token = token.strip_prefix("--").unwrap_or(token);
      if token.is_empty() {
        continue;
      }

      match token.split_once('=') {
        Some((key, value)) => match value {
          "true" => set.set_bool(key, true),
          "false" => set.set_bool(key, false),
          _ => set.set_str(key, value),
        },
        None => set.set_bool(token, true),
      }
    }

    set
  }

  pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.entries.insert(key.into(), OverrideValue::Str(value.into()));
  }

  pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
    self.entries.insert(key.into(), OverrideValue::Bool(value));
  }

  pub fn get(&self, key: &str) -> Option<&OverrideValue> {
    self.entries.get(key)
  }

  /// String value for a key, if it holds one
  pub fn get_str(&self, key: &str) -> Option<&str> {
    match self.entries.get(key) {
      Some(OverrideValue::Str(s)) => Some(s),
      _ => None,
    }
  }

  /// Whether the key is present and truthy
  pub fn is_truthy(&self, key: &str) -> bool {
    self.entries.get(key).is_some_and(|v| v.is_truthy())
  }

  pub fn contains(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &OverrideValue)> {
    self.entries.iter()
  }
}

/// Named publish flags that patch the override set after seeding.
///
/// Mirrors the user-facing publish arguments; assembled by the dispatcher from
/// its own argument struct so the builder stays independent of clap.
#[derive(Debug, Clone, Default)]
pub struct PublishFlags {
  pub registry: Option<String>,
  pub tag: Option<String>,
  pub otp: Option<String>,
  pub dry_run: bool,
  pub first_release: bool,
  pub verbose: bool,
}

/// Build the override set for one group dispatch and apply cross-cutting flags.
///
/// Starts from the unparsed tokens, then conditionally patches the named flags,
/// only when supplied, so absent flags never shadow a token-provided value with
/// an empty one. Dry-run additionally flips the `ExecEnv` dry-run indicator so
/// every process the engine spawns observes the same semantics; verbose flips
/// the verbose indicator. Both indicators stay set for the rest of the run.
pub fn build_publish_overrides(unparsed: &[String], flags: &PublishFlags, env: &mut ExecEnv) -> OverrideSet {
  let mut overrides = OverrideSet::parse_tokens(unparsed);

  if let Some(registry) = &flags.registry {
    overrides.set_str("registry", registry);
  }
  if let Some(tag) = &flags.tag {
    overrides.set_str("tag", tag);
  }
  if let Some(otp) = &flags.otp {
    overrides.set_str("otp", otp);
  }
  if flags.dry_run {
    overrides.set_bool("dry-run", true);
    env.set_dry_run();
  }
  if flags.first_release {
    overrides.set_bool("first-release", true);
  }
  if flags.verbose {
    env.set_verbose();
  }

  overrides
}
