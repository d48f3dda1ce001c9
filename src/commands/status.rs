// Implements `dotbins status`: what `versions.json` says is installed.

use super::load_config;
use crate::cli::cmd_enums::GlobalOptions;
use anyhow::Result;
use dotbins::log_info;
use dotbins::schemas::state_file::VersionStore;
use prettytable::{Table, format, row};
use std::process::ExitCode;

pub fn run(global: &GlobalOptions) -> Result<ExitCode> {
    let config = load_config(global)?;
    let store = VersionStore::load(&config.tools_dir);
    if store.is_empty() {
        log_info!("[Status] Nothing installed yet in {}", config.tools_dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Tool/Platform/Arch", "Version", "Updated", "SHA-256", "Asset"]);
    for (key, entry) in store.entries() {
        let short_sha: String = entry.sha256.chars().take(12).collect();
        table.add_row(row![key, entry.version, entry.updated_at, short_sha, entry.asset]);
    }
    table.printstd();
    Ok(ExitCode::SUCCESS)
}
