use crate::commands::get::GetArgs;
use crate::commands::sync::SyncArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Defines the command-line interface (CLI) for `dotbins`.
/// `#[derive(Parser)]` generates the argument parsing code via `clap`.
#[derive(Parser)]
#[command(name = "dotbins", version)]
#[command(about = "Fetch pre-built CLI binaries from GitHub Releases into your dotfiles")]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    /// Path to the configuration file. Searched in the usual places when omitted.
    #[arg(long, global = true, env = "DOTBINS_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Overrides `tools_dir` from the configuration file.
    #[arg(long, global = true)]
    pub(crate) tools_dir: Option<String>,

    /// GitHub token for API requests (helps with rate limits and private repos).
    /// Takes precedence over the `GITHUB_TOKEN` environment variable.
    #[arg(long, global = true)]
    pub(crate) github_token: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Options every subcommand shares.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub tools_dir: Option<String>,
    pub github_token: Option<String>,
}

/// All supported subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Download and install the configured tools for every platform/arch.
    #[command(visible_alias = "update")]
    Sync(SyncArgs),
    /// Download one tool straight into a directory, without a configuration file.
    Get(GetArgs),
    /// List the configured tools.
    List,
    /// Show what is installed, from `versions.json`.
    Status,
    /// Show the current version of dotbins.
    Version,
}
