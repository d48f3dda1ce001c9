// Implements `dotbins list`: one row per configured tool.

use super::load_config;
use crate::cli::cmd_enums::GlobalOptions;
use anyhow::Result;
use dotbins::log_info;
use prettytable::{Table, format, row};
use std::process::ExitCode;

pub fn run(global: &GlobalOptions) -> Result<ExitCode> {
    let config = load_config(global)?;
    if config.tools.is_empty() && config.invalid_tools.is_empty() {
        log_info!("[List] No tools configured");
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Tool", "Repo", "Tag", "Binaries"]);
    for spec in config.tools.values() {
        let binaries: Vec<&str> = spec.binaries.iter().map(|b| b.name.as_str()).collect();
        table.add_row(row![
            spec.name,
            spec.repo,
            spec.tag.as_deref().unwrap_or("latest"),
            binaries.join(", ")
        ]);
    }
    for (name, err) in &config.invalid_tools {
        table.add_row(row![name, "-", "-", format!("invalid: {}", err.reason())]);
    }
    table.printstd();
    Ok(ExitCode::SUCCESS)
}
