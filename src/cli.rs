use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
}

/// Output format for validation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable status lines
    Human,
    /// Machine-readable JSON
    Json,
}

/// Validate environment variables against a declarative schema
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-env")]
#[command(about = "Validate environment variables against a declarative schema")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate the environment and report errors and warnings
    Check(CheckArgs),
    /// Print a .env.example file generated from the schema
    Example(GenerateArgs),
    /// Print a TypeScript declaration for process.env generated from the schema
    Types(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Schema file (discovered in the current directory when omitted)
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,

    /// Dotenv files to load, in order; later files override earlier ones
    #[arg(short = 'e', long = "env-file", action = clap::ArgAction::Append)]
    pub env_files: Vec<PathBuf>,

    /// Do not overlay the process environment
    #[arg(long = "no-process-env")]
    pub no_process_env: bool,

    /// Warn about variables that are set but not declared in the schema
    #[arg(long = "strict")]
    pub strict: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Schema file (discovered in the current directory when omitted)
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
