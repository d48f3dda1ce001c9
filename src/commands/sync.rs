// This file implements the `sync` command (alias `update`).
// It builds the (tool, platform, arch) units from the configuration and the
// command-line filters, hands them to the resolver, records what was installed
// in `versions.json`, and prints a summary table.

use super::{github_client, load_config};
use crate::cli::cmd_enums::GlobalOptions;
use anyhow::{Context, Result, bail};
use clap::Args;
use dotbins::libs::cleanup;
use dotbins::libs::tool_resolver::{Outcome, Resolver, UnitResult};
use dotbins::libs::utilities::platform::current_platform;
use dotbins::schemas::config::{Config, PlatformMatrix};
use dotbins::schemas::state_file::VersionStore;
use dotbins::schemas::tools::ToolSpec;
use dotbins::{log_info, log_warn};
use prettytable::{Table, format, row};
use std::process::ExitCode;

/// Arguments for `dotbins sync`.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Only these tools (default: every configured tool).
    pub tools: Vec<String>,

    /// Only this platform (e.g. `linux`, `macos`).
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Only this architecture (e.g. `amd64`, `arm64`).
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Only the platform/arch of this machine.
    #[arg(short, long, conflicts_with_all = ["platform", "arch"])]
    pub current: bool,

    /// Reinstall even when the recorded version is current.
    #[arg(short, long)]
    pub force: bool,

    /// Maximum number of parallel units (default: `max_workers` from the config).
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Afterwards, delete binaries of tools no longer in the configuration.
    #[arg(long)]
    pub cleanup: bool,
}

pub fn run(global: &GlobalOptions, args: SyncArgs) -> Result<ExitCode> {
    let config = load_config(global)?;

    let unknown: Vec<&str> = args
        .tools
        .iter()
        .filter(|t| !config.tools.contains_key(*t) && !config.invalid_tools.contains_key(*t))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!("unknown tool(s): {}", unknown.join(", "));
    }
    let wanted = |name: &str| args.tools.is_empty() || args.tools.iter().any(|t| t == name);

    let tools: Vec<&ToolSpec> = config.tools.values().filter(|t| wanted(&t.name)).collect();
    let matrix = build_matrix(&config, &args);
    let max_workers = args.jobs.unwrap_or(config.max_workers).max(1);

    let mut versions = VersionStore::load(&config.tools_dir);
    let client = github_client(global);
    let resolver = Resolver {
        tools_dir: &config.tools_dir,
        defaults: &config.defaults,
        releases: &client,
        downloader: &client,
        versions: &versions,
        force: args.force,
        bin_dir: None,
    };

    let mut results = resolver.resolve_all(&tools, &matrix, max_workers);
    for (name, err) in config.invalid_tools.iter().filter(|(name, _)| wanted(name)) {
        results.push(UnitResult {
            tool: name.clone(),
            platform: "-".to_string(),
            arch: "-".to_string(),
            outcome: Outcome::Failed(err.clone()),
        });
    }

    let mut changed = false;
    for r in &results {
        if let Outcome::Installed { version, asset, sha256, .. } = &r.outcome {
            versions.record(&r.tool, &r.platform, &r.arch, version, asset, sha256);
            changed = true;
        }
    }
    if args.cleanup {
        let keep: Vec<&str> = config.invalid_tools.keys().map(String::as_str).collect();
        let removed = cleanup::remove_stale_binaries(&config.tools_dir, &matrix, &config.tools, &keep)
            .with_context(|| format!("could not clean up {}", config.tools_dir.display()))?;
        let dropped = versions.retain_tools(|t| config.tools.contains_key(t) || config.invalid_tools.contains_key(t));
        log_info!("[Sync] Cleanup removed {} file(s) and {} version record(s)", removed.len(), dropped.len());
        changed |= !dropped.is_empty();
    }
    if changed {
        versions
            .save()
            .with_context(|| format!("could not save {}", versions.path().display()))?;
    }

    summary_table(&results).printstd();

    let failed = results.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        log_warn!("[Sync] {} of {} units failed", failed, results.len());
        Ok(ExitCode::FAILURE)
    } else {
        log_info!("[Sync] All {} units done", results.len());
        Ok(ExitCode::SUCCESS)
    }
}

/// The platform/arch cells to resolve after applying `--current`, `--platform` and `--arch`.
fn build_matrix(config: &Config, args: &SyncArgs) -> PlatformMatrix {
    if args.current {
        let (platform, arch) = current_platform();
        return PlatformMatrix::from([(platform, vec![arch])]);
    }

    let mut matrix = config.platforms.clone();
    if let Some(platform) = &args.platform {
        matrix.retain(|p, _| p == platform);
        if matrix.is_empty() {
            log_warn!("[Sync] Platform '{}' is not in the configuration, using it anyway", platform);
            let arch = args.arch.clone().unwrap_or_else(|| current_platform().1);
            matrix.insert(platform.clone(), vec![arch]);
        }
    }
    if let Some(arch) = &args.arch {
        for archs in matrix.values_mut() {
            archs.retain(|a| a == arch);
            if archs.is_empty() {
                archs.push(arch.clone());
            }
        }
    }
    matrix
}

fn summary_table(results: &[UnitResult]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Tool", "Platform", "Arch", "Status", "Detail"]);
    for r in results {
        let (status, detail) = match &r.outcome {
            Outcome::Installed { version, asset, .. } => ("installed".to_string(), format!("{version} ({asset})")),
            Outcome::UpToDate { version } => ("up to date".to_string(), version.clone()),
            Outcome::Unsupported => ("unsupported".to_string(), String::new()),
            Outcome::Failed(err) => (err.kind().to_string(), err.reason().to_string()),
        };
        table.add_row(row![r.tool, r.platform, r.arch, status, detail]);
    }
    table
}
