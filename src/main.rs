use cargo_convoy::commands;
use cargo_convoy::core::context::WorkspaceContext;
use cargo_convoy::core::error::{ConvoyError, print_error};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Publish Cargo workspace release groups in one orchestrated pass
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Convoy(ConvoyCli),
}

#[derive(Parser)]
#[command(name = "convoy")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct ConvoyCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Publish release groups (all of them, or a filtered selection)
  Publish {
    /// Only publish these projects (within the selected groups)
    projects: Vec<String>,

    /// Only publish these release groups
    #[arg(short, long, value_delimiter = ',')]
    groups: Vec<String>,

    /// Registry to publish to
    #[arg(long)]
    registry: Option<String>,

    /// Distribution tag to apply
    #[arg(long)]
    tag: Option<String>,

    /// One-time password for registries that require it
    #[arg(long)]
    otp: Option<String>,

    /// Validate everything without uploading
    #[arg(long)]
    dry_run: bool,

    /// Treat every selected project as never published before
    #[arg(long)]
    first_release: bool,

    /// Verbose logging (also propagated to dispatched processes)
    #[arg(long)]
    verbose: bool,

    /// Render the task graph instead of publishing
    #[arg(long)]
    graph: bool,

    /// Destination file for --graph (default: .convoy/task-graph-<digest>.dot)
    #[arg(long, requires = "graph")]
    graph_file: Option<PathBuf>,

    /// Task output style: static (capture, replay on failure) or stream
    #[arg(long, default_value = "static")]
    output_style: String,

    /// Raw overrides forwarded to the execution engine (after `--`)
    #[arg(last = true, allow_hyphen_values = true)]
    overrides: Vec<String>,
  },

  /// Show release groups, membership and publish eligibility
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let CargoCli::Convoy(cli) = CargoCli::parse();

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  // Build workspace context once (loads metadata, graph, config)
  let ctx = match WorkspaceContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  match cli.command {
    Commands::Publish {
      projects,
      groups,
      registry,
      tag,
      otp,
      dry_run,
      first_release,
      verbose,
      graph,
      graph_file,
      output_style,
      overrides,
    } => {
      // The aggregate group status is the process exit code, emitted without
      // an extra diagnostic; fatal orchestration errors go through
      // handle_error instead
      match commands::run_publish(
        &ctx,
        projects,
        groups,
        registry,
        tag,
        otp,
        dry_run,
        first_release,
        verbose,
        graph,
        graph_file,
        output_style,
        overrides,
      ) {
        Ok(status) => std::process::exit(status),
        Err(e) => handle_error(e),
      }
    }
    Commands::Status { json } => {
      if let Err(e) = commands::run_status(&ctx, json) {
        handle_error(e);
      }
    }
  }
}

fn handle_error(err: ConvoyError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code());
}
