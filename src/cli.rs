//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the shell-script generator.
#[derive(Parser, Debug)]
#[command(
    name = "shellgen",
    about = "Render declarative YAML configs into shell scripts",
    version
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render config files to shell-script text on stdout
    Generate(GenerateOpts),
    /// Print the default variable set for a shell
    Vars(VarsOpts),
    /// Print version information
    Version,
}

/// Options for the `generate` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct GenerateOpts {
    /// Config files or directories to render
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Target shell the output will be sourced by
    #[arg(short, long, default_value = "bash")]
    pub shell: String,

    /// Additional variable files, merged left to right
    #[arg(long = "values", value_name = "FILE")]
    pub value_files: Vec<PathBuf>,

    /// Ad-hoc KEY=VALUE variable overrides, highest precedence
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Wrap every command with timing instrumentation
    #[arg(long)]
    pub instrument: bool,

    /// Timeout in seconds for `run` command execution
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Print a content digest of the inputs instead of rendering
    #[arg(long)]
    pub hash: bool,
}

/// Options for the `vars` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct VarsOpts {
    /// Target shell the variables describe
    #[arg(short, long, default_value = "bash")]
    pub shell: String,
}
