// Register application subcommands.
// Each module corresponds to one `dotbins` command-line action.

use crate::cli::cmd_enums::GlobalOptions;
use anyhow::{Context, Result};
use dotbins::libs::github::GitHubClient;
use dotbins::log_debug;
use dotbins::schemas::config::{Config, expand_path};

// Installs a single tool without a configuration file.
pub mod get;
// Lists the configured tools.
pub mod list;
// Shows the contents of `versions.json`.
pub mod status;
// Resolves and installs every (tool, platform, arch) unit.
pub mod sync;
// Displays the version of dotbins.
pub mod version;

/// Loads the configuration and applies the global command-line overrides.
pub(crate) fn load_config(global: &GlobalOptions) -> Result<Config> {
    let mut config = Config::discover(global.config.as_deref()).context("could not load configuration")?;
    if let Some(dir) = &global.tools_dir {
        config.tools_dir = expand_path(dir);
        log_debug!("[Config] tools_dir overridden to {}", config.tools_dir.display());
    }
    Ok(config)
}

/// A GitHub client honoring `--github-token`.
pub(crate) fn github_client(global: &GlobalOptions) -> GitHubClient {
    GitHubClient::default().with_token(global.github_token.clone())
}
