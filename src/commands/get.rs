// This file implements the `get` command.
// It installs one tool (`owner/repo`), or every tool of a remote configuration
// (`https://.../dotbins.yaml`), for this machine only, straight into `--dest`.
// Nothing is recorded in `versions.json` and the install is always forced.

use super::github_client;
use crate::cli::cmd_enums::GlobalOptions;
use anyhow::{Context, Result, bail};
use clap::Args;
use dotbins::libs::github::AssetDownloader;
use dotbins::libs::tool_resolver::{Outcome, Resolver};
use dotbins::libs::utilities::platform::current_platform;
use dotbins::schemas::config::{Config, DEFAULT_MAX_WORKERS, DetectionDefaults, PlatformMatrix, expand_path};
use dotbins::schemas::state_file::VersionStore;
use dotbins::schemas::tools::{RawToolEntry, ToolSpec};
use dotbins::{log_error, log_info};
use std::process::ExitCode;

/// Arguments for `dotbins get`.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// `owner/repo`, or the URL of a dotbins YAML configuration.
    pub source: String,

    /// Directory to put the binaries in.
    #[arg(long, default_value = "~/.local/bin")]
    pub dest: String,

    /// Tool name, which is also the binary name (default: the repository name).
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(global: &GlobalOptions, args: GetArgs) -> Result<ExitCode> {
    let (platform, arch) = current_platform();
    let matrix = PlatformMatrix::from([(platform, vec![arch])]);
    let dest = expand_path(&args.dest);
    let client = github_client(global);

    let tools: Vec<ToolSpec> = if is_config_url(&args.source) {
        log_info!("[Get] Loading tools from {}", args.source);
        let body = client.download(&args.source)?;
        let text = String::from_utf8(body).with_context(|| format!("{} is not UTF-8 text", args.source))?;
        let remote = Config::from_yaml_str(&text, &args.source)?;
        for (name, err) in &remote.invalid_tools {
            log_error!("[Get] Skipping '{}': {}", name, err.reason());
        }
        if remote.tools.is_empty() {
            bail!("{} configures no valid tools", args.source);
        }
        remote.tools.into_values().collect()
    } else {
        vec![tool_from_repo(&args.source, args.name.as_deref(), &matrix)?]
    };

    let tmp = tempfile::tempdir().context("could not create a scratch directory")?;
    let versions = VersionStore::load(tmp.path());
    let defaults = DetectionDefaults::default();
    let resolver = Resolver {
        tools_dir: tmp.path(),
        defaults: &defaults,
        releases: &client,
        downloader: &client,
        versions: &versions,
        force: true,
        bin_dir: Some(&dest),
    };

    let refs: Vec<&ToolSpec> = tools.iter().collect();
    let results = resolver.resolve_all(&refs, &matrix, DEFAULT_MAX_WORKERS);

    let mut failed = 0;
    for r in &results {
        match &r.outcome {
            Outcome::Installed { version, asset, .. } => {
                log_info!("[Get] {} {} installed to {} ({})", r.tool, version, dest.display(), asset)
            }
            Outcome::UpToDate { version } => log_info!("[Get] {} {} already installed", r.tool, version),
            Outcome::Unsupported => {
                failed += 1;
                log_error!("[Get] {} is not available for {}/{}", r.tool, r.platform, r.arch)
            }
            Outcome::Failed(err) => {
                failed += 1;
                log_error!("[Get] {}: {}: {}", r.tool, err.kind(), err.reason())
            }
        }
    }
    Ok(if failed > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn is_config_url(source: &str) -> bool {
    source.contains("://") && (source.ends_with(".yaml") || source.ends_with(".yml"))
}

/// A tool built from a bare `owner/repo`, named after `name` or the repository.
fn tool_from_repo(repo: &str, name: Option<&str>, matrix: &PlatformMatrix) -> Result<ToolSpec> {
    let name = match name {
        Some(name) => name.to_string(),
        None => repo.trim_end_matches('/').rsplit('/').next().unwrap_or(repo).to_string(),
    };
    Ok(ToolSpec::from_raw(&name, RawToolEntry::Repo(repo.to_string()), matrix)?)
}
