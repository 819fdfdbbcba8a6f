//! Command tree for fn-export
//!
//! - `export`: generate a pipeline manifest for a CI engine
//! - `source`: materialize a resource stream into a package directory
//! - `completions`: generate shell completions

pub mod completions;
pub mod export;
pub mod source;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use fn_export::Config;
use fn_export::infrastructure::DEFAULT_FILENAME_PATTERN;
use std::path::PathBuf;

/// CLI arguments for fn-export
#[derive(Parser, Debug)]
#[command(name = "fn-export")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file supplying defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a pipeline manifest that runs functions against a directory
    Export {
        /// Directory to run functions against, relative to the workspace root
        dir: String,
        /// Additional function search path (repeatable, order kept)
        #[arg(long = "fn-path")]
        fn_paths: Vec<String>,
        /// Target CI engine (tekton, github-actions, gitlab-ci)
        #[arg(short, long)]
        workflow: Option<String>,
        /// Function runner image
        #[arg(short, long)]
        image: Option<String>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Progress printer (events, table, json)
        #[arg(short, long)]
        printer: Option<String>,
    },

    /// Write resources read from stdin into a package directory
    Source {
        /// Package directory to create
        dir: PathBuf,
        /// File name pattern; %n is the resource name, %k its kind
        #[arg(long, default_value = DEFAULT_FILENAME_PATTERN)]
        pattern: String,
        /// Progress printer (events, table, json)
        #[arg(short, long)]
        printer: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl From<ShellArg> for clap_complete::Shell {
    fn from(shell: ShellArg) -> Self {
        match shell {
            ShellArg::Bash => Self::Bash,
            ShellArg::Zsh => Self::Zsh,
            ShellArg::Fish => Self::Fish,
            ShellArg::PowerShell => Self::PowerShell,
            ShellArg::Elvish => Self::Elvish,
        }
    }
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    fn_export::init_logging(args.log_level.as_deref().unwrap_or(&config.log_level));

    match args.command {
        Command::Export {
            dir,
            fn_paths,
            workflow,
            image,
            output,
            printer,
        } => {
            let options = export::ExportOptions {
                dir,
                fn_paths,
                workflow,
                image,
                output,
                printer,
            };
            export::run_export(&options, &config)?;
        }
        Command::Source {
            dir,
            pattern,
            printer,
        } => {
            let printer = printer.as_deref().unwrap_or(&config.printer);
            source::source_package(&dir, &pattern, std::io::stdin().lock(), printer)?;
        }
        Command::Completions { shell, output } => {
            let completions = completions::generate_completions(shell.into())?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                print!("{completions}");
            }
        }
    }

    Ok(())
}
