//! iterlint CLI tool.
//!
//! Usage:
//! ```bash
//! iterlint lint [OPTIONS] [PATH]
//! iterlint list-rules
//! iterlint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use iterlint_core::{Category, Severity};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter for misused array-iteration constructs
#[derive(Parser)]
#[command(name = "iterlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a file or directory
    Lint {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Categories to disable (comma-separated names, kebab names or codes)
        #[arg(long, value_delimiter = ',')]
        disable: Vec<Category>,

        /// Exit non-zero when a finding is at or above this severity
        #[arg(long)]
        severity: Option<Severity>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available categories
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-finding compact format.
    Compact,
    /// Source snippets rendered with miette.
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Lint {
            path,
            format,
            disable,
            severity,
            exclude,
        } => {
            let source = config_resolver::resolve(&project_dir(&path), cli.config.as_deref());
            let options = commands::lint::LintOptions {
                format,
                disable,
                severity,
                exclude,
            };
            let failed = commands::lint::run(&path, &options, &source)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}

/// Directory searched for a project config: the path itself, or a file's parent.
fn project_dir(path: &std::path::Path) -> PathBuf {
    if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf)
    } else {
        path.to_path_buf()
    }
}
