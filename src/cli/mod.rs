//! CLI command definitions and handlers

mod aggregate;
mod analyze;
mod init;

use crate::config::{load_project_config, ProjectConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Parse and validate workers count (0 = auto, at most 64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// depadvice - dependency health for multi-module builds
#[derive(Parser, Debug)]
#[command(name = "depadvice")]
#[command(
    version,
    about = "Dependency health analysis: find unused, undeclared, and mis-scoped dependencies",
    long_about = "depadvice reads a project model (modules, their declared dependencies and \
the symbols they reference) and reports which dependencies should be added, removed, or \
moved to another configuration, plus plugins that no longer do anything.",
    after_help = "\
Examples:
  depadvice analyze project.json                 Analyze every module in the model
  depadvice analyze project.json --format json   JSON output for scripting
  depadvice analyze project.json --fail-on-advice   Exit code 1 if any advice (CI mode)
  depadvice aggregate reports/modules            Merge per-module reports
  depadvice init                                 Write a default depadvice.toml"
)]
pub struct Cli {
    /// Project root holding depadvice.toml; reports are written below it
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (0 = auto, max 64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Announce report locations and summaries (overrides the config file)
    #[arg(long, global = true)]
    pub chatty: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a depadvice.toml config file with default settings
    Init,

    /// Analyze every module of a project model
    Analyze {
        /// Project model file (JSON, or TOML with a .toml extension)
        model: PathBuf,

        /// Output format for stdout: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Report directory (default: from config, below the project root)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with code 1 when any module has advice
        #[arg(long)]
        fail_on_advice: bool,
    },

    /// Merge per-module report files into one build health report
    Aggregate {
        /// Report files, or directories of *.json report files
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Output format for stdout: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Report directory (default: from config, below the project root)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

/// Settings shared by the reporting commands after config and flags merge
pub(crate) struct RunSettings {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub chatty: bool,
    pub workers: usize,
    pub format: String,
    pub output_dir: PathBuf,
}

impl RunSettings {
    fn resolve(
        root: &Path,
        chatty: Option<bool>,
        workers: Option<usize>,
        format: Option<String>,
        output: Option<PathBuf>,
    ) -> Self {
        let config = load_project_config(root);
        let output_dir = output.unwrap_or_else(|| config.output_dir(root));
        Self {
            root: root.to_path_buf(),
            chatty: chatty.unwrap_or(config.chatty),
            workers: workers.or(config.defaults.workers).unwrap_or(0),
            format: format
                .or_else(|| config.defaults.format.clone())
                .unwrap_or_else(|| "text".to_string()),
            output_dir,
            config,
        }
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.root),

        Commands::Analyze {
            model,
            format,
            output,
            fail_on_advice,
        } => {
            let settings = RunSettings::resolve(&cli.root, cli.chatty, cli.workers, format, output);
            let fail_on_advice =
                fail_on_advice || settings.config.defaults.fail_on_advice.unwrap_or(false);
            analyze::run(&model, &settings, fail_on_advice)
        }

        Commands::Aggregate {
            reports,
            format,
            output,
        } => {
            let settings = RunSettings::resolve(&cli.root, cli.chatty, cli.workers, format, output);
            aggregate::run(&reports, &settings)
        }
    }
}
