//! # Tool Configuration Schema
//!
//! Data structures for a single tool entry of `dotbins.yaml`, in two layers:
//!
//! - **Raw** (`RawToolEntry`, `RawToolConfig`, ...): mirrors whatever shape the user
//!   wrote. Several fields accept more than one shape (a string or a list, a global
//!   pattern or a per-platform map), so these are untagged serde enums.
//! - **Normalized** (`ToolSpec`): produced once at load time by [`ToolSpec::from_raw`].
//!   The resolution engine only ever sees this canonical shape: binaries as a list of
//!   `(name, optional path)` pairs and asset patterns as a total
//!   `platform -> arch -> PatternSlot` table over the configured build matrix.
//!
//! ## Example
//!
//! ```yaml
//! tools:
//!   fzf: junegunn/fzf
//!   bat:
//!     repo: sharkdp/bat
//!     path_in_archive: bat-v{version}-{arch}-*/bat
//!     arch_map: { amd64: x86_64, arm64: aarch64 }
//!     asset_patterns:
//!       linux: bat-v{version}-{arch}-unknown-linux-musl.tar.gz
//!       macos: bat-v{version}-{arch}-apple-darwin.tar.gz
//!       windows: null
//! ```

use crate::error::ResolveError;
use crate::libs::pattern;
use crate::log_debug;
use crate::schemas::config::PlatformMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// RAW SHAPES
// ============================================================================

/// A field that may be written as a single string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// A tool entry is either a bare `owner/repo` string or a full mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawToolEntry {
    Repo(String),
    Full(Box<RawToolConfig>),
}

/// `asset_patterns` as written: one global pattern, or a map keyed by platform.
/// A `null` platform value means the tool is not supported on that platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawAssetPatterns {
    Global(String),
    PerPlatform(BTreeMap<String, Option<RawPlatformPatterns>>),
}

/// The value of one platform inside `asset_patterns`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPlatformPatterns {
    AllArches(String),
    PerArch(BTreeMap<String, Option<String>>),
}

/// Shell snippet attached to a tool. Opaque to the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShellCode {
    AnyShell(String),
    PerShell(BTreeMap<String, String>),
}

/// Full tool mapping as written in the YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawToolConfig {
    pub repo: Option<String>,
    pub tag: Option<String>,
    pub binary_name: Option<OneOrMany>,
    #[serde(alias = "binary_path")]
    pub path_in_archive: Option<OneOrMany>,
    #[serde(alias = "extract_binary")]
    pub extract_archive: Option<bool>,
    pub asset_patterns: Option<RawAssetPatterns>,
    #[serde(default)]
    pub platform_map: BTreeMap<String, String>,
    #[serde(default)]
    pub arch_map: BTreeMap<String, String>,
    pub shell_code: Option<ShellCode>,
}

// ============================================================================
// NORMALIZED SHAPES
// ============================================================================

/// What to do for one (platform, arch) cell of the build matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSlot {
    /// No pattern configured: let the auto-detector score the release assets.
    AutoDetect,
    /// Explicit `null`: the tool does not exist for this platform/arch.
    Unsupported,
    /// Explicit pattern template, still containing its `{placeholders}`.
    Pattern(String),
}

/// One logical binary of a tool and where to find it inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySpec {
    pub name: String,
    /// Pattern template; `None` means auto-detect by name.
    pub path_in_archive: Option<String>,
}

/// A validated, normalized tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub repo: String,
    /// Pinned release tag; `None` means the latest release.
    pub tag: Option<String>,
    pub binaries: Vec<BinarySpec>,
    /// `None` means "decide from the chosen asset's extension".
    pub extract_archive: Option<bool>,
    /// Resolved slot per `platform -> arch` cell: every cell of the configured matrix,
    /// plus any cell named explicitly in `asset_patterns`.
    pub asset_patterns: BTreeMap<String, BTreeMap<String, PatternSlot>>,
    /// Platform-wide values (`linux: null`, `linux: pattern`), used for arches
    /// the table does not list.
    pub platform_patterns: BTreeMap<String, PatternSlot>,
    /// The global pattern, or `AutoDetect`; used for platforms not mentioned at all.
    pub default_pattern: PatternSlot,
    pub platform_map: BTreeMap<String, String>,
    pub arch_map: BTreeMap<String, String>,
    pub shell_code: Option<ShellCode>,
}

impl ToolSpec {
    /// Normalizes and validates a raw entry against the configured build matrix.
    ///
    /// # Errors
    /// `ResolveError::Configuration` when `repo` is missing or malformed, when
    /// `binary_name` and `path_in_archive` disagree in length, or when a pattern
    /// uses a placeholder other than `{version}`, `{platform}` or `{arch}`.
    pub fn from_raw(
        name: &str,
        raw: RawToolEntry,
        platforms: &PlatformMatrix,
    ) -> Result<Self, ResolveError> {
        let raw = match raw {
            RawToolEntry::Repo(repo) => RawToolConfig {
                repo: Some(repo),
                ..RawToolConfig::default()
            },
            RawToolEntry::Full(cfg) => *cfg,
        };

        let repo = raw.repo.unwrap_or_default().trim().to_string();
        if repo.is_empty() {
            return Err(ResolveError::Configuration(format!(
                "tool '{name}' is missing required field 'repo'"
            )));
        }
        if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
            return Err(ResolveError::Configuration(format!(
                "tool '{name}': 'repo' must look like 'owner/name', got '{repo}'"
            )));
        }

        let names = raw
            .binary_name
            .map(OneOrMany::into_vec)
            .unwrap_or_else(|| vec![name.to_string()]);
        if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
            return Err(ResolveError::Configuration(format!(
                "tool '{name}': 'binary_name' must not be empty"
            )));
        }

        let paths = raw.path_in_archive.map(OneOrMany::into_vec);
        let binaries = match paths {
            None => names
                .into_iter()
                .map(|n| BinarySpec {
                    name: n,
                    path_in_archive: None,
                })
                .collect::<Vec<_>>(),
            Some(paths) if paths.len() == names.len() => {
                for path in &paths {
                    pattern::check_tokens(path)?;
                }
                names
                    .into_iter()
                    .zip(paths)
                    .map(|(n, p)| BinarySpec {
                        name: n,
                        path_in_archive: Some(p),
                    })
                    .collect()
            }
            Some(paths) => {
                return Err(ResolveError::Configuration(format!(
                    "tool '{name}': 'binary_name' has {} entries but 'path_in_archive' has {}",
                    names.len(),
                    paths.len()
                )));
            }
        };

        let patterns = normalize_asset_patterns(name, raw.asset_patterns, platforms)?;

        Ok(ToolSpec {
            name: name.to_string(),
            repo,
            tag: raw.tag.filter(|t| !t.trim().is_empty() && t != "latest"),
            binaries,
            extract_archive: raw.extract_archive,
            asset_patterns: patterns.cells,
            platform_patterns: patterns.per_platform,
            default_pattern: patterns.default,
            platform_map: raw.platform_map,
            arch_map: raw.arch_map,
            shell_code: raw.shell_code,
        })
    }

    /// The slot for one `platform`/`arch` cell.
    ///
    /// Cells added on the command line outside the configured matrix still honor
    /// what was written: the per-arch value, else the platform-wide value, else
    /// the global pattern (or auto-detection when there is none).
    pub fn pattern_for(&self, platform: &str, arch: &str) -> &PatternSlot {
        self.asset_patterns
            .get(platform)
            .and_then(|archs| archs.get(arch))
            .or_else(|| self.platform_patterns.get(platform))
            .unwrap_or(&self.default_pattern)
    }

    /// The platform name in the tool's own vocabulary (after `platform_map`).
    pub fn tool_platform<'a>(&'a self, platform: &'a str) -> &'a str {
        self.platform_map
            .get(platform)
            .map(String::as_str)
            .unwrap_or(platform)
    }

    /// The architecture name in the tool's own vocabulary (after `arch_map`).
    pub fn tool_arch<'a>(&'a self, arch: &'a str) -> &'a str {
        self.arch_map.get(arch).map(String::as_str).unwrap_or(arch)
    }
}

/// `asset_patterns` after normalization.
struct NormalizedPatterns {
    cells: BTreeMap<String, BTreeMap<String, PatternSlot>>,
    per_platform: BTreeMap<String, PatternSlot>,
    default: PatternSlot,
}

fn checked(pat: Option<String>) -> Result<PatternSlot, ResolveError> {
    match pat {
        None => Ok(PatternSlot::Unsupported),
        Some(pat) => {
            pattern::check_tokens(&pat)?;
            Ok(PatternSlot::Pattern(pat))
        }
    }
}

/// Expands the user's `asset_patterns` into a total table over the build matrix,
/// keeping the platform-wide and global values for cells outside it.
fn normalize_asset_patterns(
    tool_name: &str,
    patterns: Option<RawAssetPatterns>,
    platforms: &PlatformMatrix,
) -> Result<NormalizedPatterns, ResolveError> {
    let default = match patterns {
        Some(RawAssetPatterns::Global(ref pat)) => checked(Some(pat.clone()))?,
        _ => PatternSlot::AutoDetect,
    };
    let mut cells: BTreeMap<String, BTreeMap<String, PatternSlot>> = platforms
        .iter()
        .map(|(platform, archs)| {
            let row = archs.iter().map(|arch| (arch.clone(), default.clone())).collect();
            (platform.clone(), row)
        })
        .collect();
    let mut per_platform = BTreeMap::new();

    let Some(RawAssetPatterns::PerPlatform(entries)) = patterns else {
        return Ok(NormalizedPatterns {
            cells,
            per_platform,
            default,
        });
    };

    for (platform, value) in entries {
        if !platforms.contains_key(&platform) {
            log_debug!(
                "[Config] Tool '{}': 'asset_patterns' names platform '{}', which is not in the configured matrix",
                tool_name,
                platform
            );
        }
        let row = cells.entry(platform.clone()).or_default();
        match value {
            None => {
                row.values_mut().for_each(|slot| *slot = PatternSlot::Unsupported);
                per_platform.insert(platform, PatternSlot::Unsupported);
            }
            Some(RawPlatformPatterns::AllArches(pat)) => {
                let slot = checked(Some(pat))?;
                row.values_mut().for_each(|cell| *cell = slot.clone());
                per_platform.insert(platform, slot);
            }
            Some(RawPlatformPatterns::PerArch(per_arch)) => {
                // Arches this map does not name fall back to auto-detection.
                row.values_mut().for_each(|slot| *slot = PatternSlot::AutoDetect);
                per_platform.insert(platform.clone(), PatternSlot::AutoDetect);
                for (arch, pat) in per_arch {
                    let known = platforms.get(&platform).is_some_and(|archs| archs.contains(&arch));
                    if !known {
                        log_debug!(
                            "[Config] Tool '{}': 'asset_patterns' names {}/{}, which is not in the configured matrix",
                            tool_name,
                            platform,
                            arch
                        );
                    }
                    row.insert(arch, checked(pat)?);
                }
            }
        }
    }

    Ok(NormalizedPatterns {
        cells,
        per_platform,
        default,
    })
}
