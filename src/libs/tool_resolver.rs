//! # Tool Resolution
//!
//! Ties the engine together for every `(tool, platform, arch)` unit:
//!
//! ```text
//! pattern slot ──> select asset ──> up-to-date? ──> download ──> extract/copy ──> locate ──> write
//!   (explicit / auto-detect / unsupported)
//! ```
//!
//! Units are independent. [`Resolver::resolve_all`] fetches each tool's release
//! once, then runs the units on a bounded `rayon` pool. A failing unit produces a
//! [`Outcome::Failed`] and never affects the others. Results come back in unit
//! order (tools as given, platforms sorted, arches as configured).

use crate::error::ResolveError;
use crate::libs::asset_detection;
use crate::libs::binary_locator;
use crate::libs::github::{AssetDownloader, ReleaseSource};
use crate::libs::pattern;
use crate::libs::utilities::binary::{sha256_hex, write_binary_atomic};
use crate::libs::utilities::compression::{ArchiveFormat, AssetArchive};
use crate::libs::utilities::platform::executable_file_name;
use crate::schemas::config::{DetectionDefaults, PlatformMatrix, bin_dir};
use crate::schemas::release::{Release, ReleaseAsset};
use crate::schemas::state_file::VersionStore;
use crate::schemas::tools::{PatternSlot, ToolSpec};
use crate::{log_debug, log_error, log_info, log_warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// What happened to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Binaries were written.
    Installed {
        version: String,
        asset: String,
        sha256: String,
        binaries: Vec<PathBuf>,
    },
    /// The recorded version is current and every binary is on disk.
    UpToDate { version: String },
    /// `asset_patterns` is `null` for this platform/arch.
    Unsupported,
    Failed(ResolveError),
}

/// The outcome of one `(tool, platform, arch)` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitResult {
    pub tool: String,
    pub platform: String,
    pub arch: String,
    pub outcome: Outcome,
}

impl UnitResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// The asset picked for a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'r> {
    pub asset: &'r ReleaseAsset,
    /// True when the auto-detector chose it rather than an explicit pattern.
    pub auto_detected: bool,
}

/// Chooses the release asset for one unit.
///
/// Returns `Ok(None)` when the tool is explicitly unsupported on `platform`/`arch`.
///
/// # Errors
/// * `ResolveError::Configuration` if the pattern cannot be expanded.
/// * `ResolveError::AssetNotFound` if no asset matches the pattern or survives auto-detection.
pub fn select_asset<'r>(
    tool: &ToolSpec,
    release: &'r Release,
    platform: &str,
    arch: &str,
    defaults: &DetectionDefaults,
) -> Result<Option<Selection<'r>>, ResolveError> {
    match tool.pattern_for(platform, arch) {
        PatternSlot::Unsupported => Ok(None),
        PatternSlot::Pattern(template) => {
            let expanded = pattern::expand(
                template,
                release.version(),
                platform,
                arch,
                &tool.platform_map,
                &tool.arch_map,
            )?;
            log_debug!(
                "[Resolve] {} {}/{} (as {}/{}): pattern '{}' -> '{}'",
                tool.name,
                platform,
                arch,
                tool.tool_platform(platform),
                tool.tool_arch(arch),
                template,
                expanded
            );
            // First match in release order wins.
            let glob = pattern::Glob::new(&expanded)?;
            let asset = release
                .assets
                .iter()
                .find(|a| glob.is_match(&a.name))
                .ok_or_else(|| {
                    ResolveError::AssetNotFound(format!(
                        "no asset of {} {} matches '{}' (available: {})",
                        tool.repo,
                        release.tag_name,
                        expanded,
                        release.asset_names().join(", ")
                    ))
                })?;
            Ok(Some(Selection {
                asset,
                auto_detected: false,
            }))
        }
        PatternSlot::AutoDetect => {
            let names = release.asset_names();
            let report = asset_detection::detect_asset(
                &names,
                platform,
                arch,
                &tool.platform_map,
                &tool.arch_map,
                defaults,
            )?;
            let asset = report
                .chosen
                .map(|i| &release.assets[i])
                .ok_or_else(|| ResolveError::AssetNotFound(format!("auto-detection chose nothing for {platform}/{arch}")))?;
            log_debug!("[Resolve] {} {}/{}: auto-detected '{}'", tool.name, platform, arch, asset.name);
            Ok(Some(Selection {
                asset,
                auto_detected: true,
            }))
        }
    }
}

/// Runs units against a tools directory.
pub struct Resolver<'a> {
    pub tools_dir: &'a Path,
    pub defaults: &'a DetectionDefaults,
    pub releases: &'a dyn ReleaseSource,
    pub downloader: &'a dyn AssetDownloader,
    pub versions: &'a VersionStore,
    /// Reinstall even when the recorded version is current.
    pub force: bool,
    /// Write binaries here instead of `<tools_dir>/<platform>/<arch>/bin`.
    pub bin_dir: Option<&'a Path>,
}

impl<'a> Resolver<'a> {
    /// Final paths of a tool's binaries for one platform/arch.
    pub fn destinations(&self, tool: &ToolSpec, platform: &str, arch: &str) -> Vec<PathBuf> {
        let dir = match self.bin_dir {
            Some(dir) => dir.to_path_buf(),
            None => bin_dir(self.tools_dir, platform, arch),
        };
        tool.binaries
            .iter()
            .map(|b| dir.join(executable_file_name(&b.name, platform)))
            .collect()
    }

    fn is_up_to_date(&self, tool: &ToolSpec, release: &Release, platform: &str, arch: &str) -> bool {
        if self.force {
            return false;
        }
        self.versions
            .get(&tool.name, platform, arch)
            .is_some_and(|entry| entry.version == release.version())
            && self.destinations(tool, platform, arch).iter().all(|p| p.is_file())
    }

    /// Resolves one unit against an already fetched release.
    pub fn resolve_unit(&self, tool: &ToolSpec, release: &Release, platform: &str, arch: &str) -> Outcome {
        if tool.pattern_for(platform, arch) == &PatternSlot::Unsupported {
            log_info!("[Resolve] {} is not supported on {}/{}, skipping", tool.name, platform, arch);
            return Outcome::Unsupported;
        }
        if self.is_up_to_date(tool, release, platform, arch) {
            log_info!("[Resolve] {} {}/{} is up to date ({})", tool.name, platform, arch, release.version());
            return Outcome::UpToDate {
                version: release.version().to_string(),
            };
        }
        match self.install(tool, release, platform, arch) {
            Ok(outcome) => outcome,
            Err(err) => {
                log_error!("[Resolve] {} {}/{}: {}", tool.name, platform, arch, err);
                Outcome::Failed(err)
            }
        }
    }

    fn install(&self, tool: &ToolSpec, release: &Release, platform: &str, arch: &str) -> Result<Outcome, ResolveError> {
        let Some(selection) = select_asset(tool, release, platform, arch, self.defaults)? else {
            return Ok(Outcome::Unsupported);
        };
        let asset = selection.asset;
        log_info!("[Resolve] {} {}/{}: downloading {}", tool.name, platform, arch, asset.name);

        let bytes = self.downloader.download(&asset.browser_download_url)?;
        let sha256 = sha256_hex(&bytes);

        let files = self.extract_binaries(tool, release, &asset.name, &bytes, platform, arch)?;
        let mut written = Vec::with_capacity(files.len());
        for (dest, data) in files {
            write_binary_atomic(&dest, &data)?;
            written.push(dest);
        }

        log_info!(
            "[Resolve] {} {}/{}: installed {} from {}",
            tool.name,
            platform,
            arch,
            release.version(),
            asset.name
        );
        Ok(Outcome::Installed {
            version: release.version().to_string(),
            asset: asset.name.clone(),
            sha256,
            binaries: written,
        })
    }

    /// Produces `(destination, bytes)` for every binary of the tool. Nothing is
    /// written until every binary has been found.
    fn extract_binaries(
        &self,
        tool: &ToolSpec,
        release: &Release,
        asset_name: &str,
        bytes: &[u8],
        platform: &str,
        arch: &str,
    ) -> Result<Vec<(PathBuf, Vec<u8>)>, ResolveError> {
        let destinations = self.destinations(tool, platform, arch);
        let format = ArchiveFormat::from_filename(asset_name);
        let extract = tool.extract_archive.unwrap_or(format != ArchiveFormat::Raw);

        if !extract {
            // The download itself is the binary (raw executables, AppImages).
            let [dest] = destinations.as_slice() else {
                return Err(ResolveError::Configuration(format!(
                    "'{}' is used as-is but {} binaries are configured",
                    asset_name,
                    destinations.len()
                )));
            };
            log_debug!("[Resolve] {} is not an archive, copying it as {}", asset_name, dest.display());
            return Ok(vec![(dest.clone(), bytes.to_vec())]);
        }
        if format == ArchiveFormat::Raw {
            return Err(ResolveError::Extraction(format!(
                "'{asset_name}' is not a recognized archive but extract_archive is true"
            )));
        }

        let archive = AssetArchive::with_format(asset_name, format, bytes);
        let entries = archive.entries()?;
        let mut files = Vec::with_capacity(tool.binaries.len());
        for (binary, dest) in tool.binaries.iter().zip(destinations) {
            let entry_path = match &binary.path_in_archive {
                Some(template) => {
                    let expanded = pattern::expand(
                        template,
                        release.version(),
                        platform,
                        arch,
                        &tool.platform_map,
                        &tool.arch_map,
                    )?;
                    binary_locator::locate(&entries, &expanded, &binary.name)?
                }
                None => binary_locator::auto_detect(&entries, &binary.name)?,
            };
            log_debug!("[Resolve] {}: '{}' found at {}", tool.name, binary.name, entry_path);
            files.push((dest, archive.read_entry(&entry_path)?));
        }
        Ok(files)
    }

    /// Resolves every unit of `tools` over `platforms` with at most `max_workers` threads.
    pub fn resolve_all(&self, tools: &[&ToolSpec], platforms: &PlatformMatrix, max_workers: usize) -> Vec<UnitResult> {
        let units: Vec<(usize, &str, &str)> = tools
            .iter()
            .enumerate()
            .flat_map(|(i, _)| {
                platforms
                    .iter()
                    .flat_map(move |(p, archs)| archs.iter().map(move |a| (i, p.as_str(), a.as_str())))
            })
            .collect();
        log_info!(
            "[Resolve] Resolving {} units for {} tools with up to {} workers",
            units.len(),
            tools.len(),
            max_workers
        );

        let work = || {
            // One release fetch per tool, skipped when every unit is unsupported.
            let releases: Vec<Option<Result<Release, ResolveError>>> = tools
                .par_iter()
                .enumerate()
                .map(|(idx, tool)| {
                    let needed = units
                        .iter()
                        .any(|&(i, p, a)| i == idx && tool.pattern_for(p, a) != &PatternSlot::Unsupported);
                    needed.then(|| self.releases.fetch_release(&tool.repo, tool.tag.as_deref()))
                })
                .collect();

            units
                .par_iter()
                .map(|&(i, platform, arch)| {
                    let tool = tools[i];
                    let outcome = if tool.pattern_for(platform, arch) == &PatternSlot::Unsupported {
                        Outcome::Unsupported
                    } else {
                        match &releases[i] {
                            Some(Ok(release)) => self.resolve_unit(tool, release, platform, arch),
                            Some(Err(err)) => Outcome::Failed(err.clone()),
                            None => Outcome::Unsupported,
                        }
                    };
                    UnitResult {
                        tool: tool.name.clone(),
                        platform: platform.to_string(),
                        arch: arch.to_string(),
                        outcome,
                    }
                })
                .collect::<Vec<_>>()
        };

        match rayon::ThreadPoolBuilder::new().num_threads(max_workers.max(1)).build() {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log_warn!("[Resolve] Could not build a worker pool ({}), using the global one", e);
                work()
            }
        }
    }
}
