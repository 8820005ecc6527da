//! Error types for cargo-convoy with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. The categories mirror the orchestrator's
//! failure channels: anything that prevents computing what to publish is fatal and
//! surfaces here; a group whose publish merely returned non-zero does not; that is
//! folded into the aggregate status instead (see `release::publish`).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cargo-convoy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad filter names)
  User = 1,
  /// System error (I/O, metadata, spawn failures)
  System = 2,
  /// Validation failure (no project eligible for publishing)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cargo-convoy
#[derive(Debug)]
pub enum ConvoyError {
  /// Configuration errors (convoy.toml missing or invalid)
  Config(ConfigError),

  /// Group/project filter errors (unknown names, bad combinations)
  Filter(FilterError),

  /// Publish-target eligibility errors (no project in a group can be dispatched)
  Eligibility(EligibilityError),

  /// I/O errors
  Io(io::Error),

  /// Aggregate publish failure, raised for programmatic callers when one or
  /// more group dispatches returned non-zero. Carries the recorded status.
  PublishFailed { status: i32 },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ConvoyError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ConvoyError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ConvoyError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ConvoyError::Message { message, context, help } => ConvoyError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the process exit code for this error.
  ///
  /// `PublishFailed` exits with the recorded aggregate status so the CLI
  /// propagates the most recent non-zero group status verbatim.
  pub fn exit_code(&self) -> i32 {
    match self {
      ConvoyError::Config(_) => ExitCode::User.as_i32(),
      ConvoyError::Filter(_) => ExitCode::User.as_i32(),
      ConvoyError::Eligibility(_) => ExitCode::Validation.as_i32(),
      ConvoyError::Io(_) => ExitCode::System.as_i32(),
      ConvoyError::PublishFailed { status } => *status,
      ConvoyError::Message { .. } => ExitCode::User.as_i32(),
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ConvoyError::Config(e) => e.help_message(),
      ConvoyError::Filter(e) => e.help_message(),
      ConvoyError::Eligibility(e) => e.help_message(),
      ConvoyError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ConvoyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConvoyError::Config(e) => write!(f, "{}", e),
      ConvoyError::Filter(e) => write!(f, "{}", e),
      ConvoyError::Eligibility(e) => write!(f, "{}", e),
      ConvoyError::Io(e) => write!(f, "I/O error: {}", e),
      ConvoyError::PublishFailed { .. } => {
        write!(f, "One or more selected projects could not be published")
      }
      ConvoyError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ConvoyError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConvoyError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ConvoyError {
  fn from(err: io::Error) -> Self {
    ConvoyError::Io(err)
  }
}

impl From<String> for ConvoyError {
  fn from(msg: String) -> Self {
    ConvoyError::message(msg)
  }
}

impl From<&str> for ConvoyError {
  fn from(msg: &str) -> Self {
    ConvoyError::message(msg)
  }
}

impl From<toml_edit::TomlError> for ConvoyError {
  fn from(err: toml_edit::TomlError) -> Self {
    ConvoyError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ConvoyError {
  fn from(err: toml_edit::de::Error) -> Self {
    ConvoyError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for ConvoyError {
  fn from(err: toml_edit::ser::Error) -> Self {
    ConvoyError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<cargo_metadata::Error> for ConvoyError {
  fn from(err: cargo_metadata::Error) -> Self {
    ConvoyError::message(format!("Cargo metadata error: {}", err))
  }
}

impl From<serde_json::Error> for ConvoyError {
  fn from(err: serde_json::Error) -> Self {
    ConvoyError::message(format!("JSON error: {}", err))
  }
}

impl From<anyhow::Error> for ConvoyError {
  fn from(err: anyhow::Error) -> Self {
    ConvoyError::message(err.to_string())
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// convoy.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Invalid configuration (bad group definitions, unknown projects, ...)
  Invalid { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create a convoy.toml at the workspace root with [[groups]] entries.".to_string())
      }
      ConfigError::Invalid { .. } => {
        Some("Run `cargo convoy status` to see the workspace projects convoy knows about.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No cargo-convoy configuration found.\nExpected file: {}/convoy.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::Invalid { reason } => {
        write!(f, "Invalid convoy configuration: {}", reason)
      }
    }
  }
}

/// Group/project filter errors
#[derive(Debug)]
pub enum FilterError {
  /// A requested release group does not exist
  UnknownGroup { name: String, available: Vec<String> },

  /// A requested project does not exist in any release group
  UnknownProject { name: String, available: Vec<String> },

  /// A requested project exists, but not inside the selected groups
  ProjectNotInGroups { name: String, groups: Vec<String> },
}

impl FilterError {
  fn help_message(&self) -> Option<String> {
    match self {
      FilterError::UnknownGroup { .. } | FilterError::UnknownProject { .. } => {
        Some("Run `cargo convoy status` to list release groups and their projects.".to_string())
      }
      FilterError::ProjectNotInGroups { .. } => {
        Some("Drop --groups, or pick a project that belongs to one of the selected groups.".to_string())
      }
    }
  }
}

impl fmt::Display for FilterError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FilterError::UnknownGroup { name, available } => {
        write!(
          f,
          "Release group '{}' not found. Available groups: {}",
          name,
          available.join(", ")
        )
      }
      FilterError::UnknownProject { name, available } => {
        write!(
          f,
          "Project '{}' is not part of any release group. Available projects: {}",
          name,
          available.join(", ")
        )
      }
      FilterError::ProjectNotInGroups { name, groups } => {
        write!(
          f,
          "Project '{}' does not belong to the selected groups ({})",
          name,
          groups.join(", ")
        )
      }
    }
  }
}

/// Publish-target eligibility errors
#[derive(Debug)]
pub enum EligibilityError {
  /// No project in the group exposes the publish target
  NoEligibleProjects {
    group: String,
    target: String,
    considered: Vec<String>,
  },
}

impl EligibilityError {
  fn help_message(&self) -> Option<String> {
    match self {
      EligibilityError::NoEligibleProjects { target, .. } => Some(format!(
        "Declare the target in each project's manifest:\n  [package.metadata.convoy]\n  targets = [\"{}\"]\nThe publish adapter writes this when it is set up for a project.",
        target
      )),
    }
  }
}

impl fmt::Display for EligibilityError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EligibilityError::NoEligibleProjects {
        group,
        target,
        considered,
      } => {
        write!(
          f,
          "None of the projects in release group '{}' expose the '{}' target.\nConsidered projects: {}\nThis usually means the publish adapter that registers the target is not set up for them.",
          group,
          target,
          considered.join(", ")
        )
      }
    }
  }
}

/// Result type alias for cargo-convoy
pub type ConvoyResult<T> = Result<T, ConvoyError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ConvoyResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ConvoyResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ConvoyError>,
{
  fn context(self, ctx: impl Into<String>) -> ConvoyResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ConvoyResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with colors and help text
pub fn print_error(error: &ConvoyError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
