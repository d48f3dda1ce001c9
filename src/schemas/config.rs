// Top-level configuration: where binaries go, which platform/arch matrix to build,
// the auto-detection defaults, and the tools themselves.
//
// The YAML is read into `RawConfig` and immediately normalized into `Config`.
// Tools that fail validation do not abort loading; they are kept in
// `Config::invalid_tools` so the sync summary can report them as failed units.

use crate::error::{ConfigError, ResolveError};
use crate::libs::utilities::platform::current_platform;
use crate::schemas::tools::{RawToolEntry, ToolSpec};
use crate::{log_debug, log_error, log_info, log_warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Platform name -> architectures to build for it.
pub type PlatformMatrix = BTreeMap<String, Vec<String>>;

pub const DEFAULT_TOOLS_DIR: &str = "~/.dotbins";
pub const DEFAULT_MAX_WORKERS: usize = 16;

/// Which C library flavor to prefer among Linux assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Libc {
    #[default]
    Musl,
    #[serde(alias = "gnu")]
    Glibc,
}

/// Which toolchain ABI to prefer among Windows assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowsAbi {
    #[default]
    Msvc,
    Gnu,
}

fn default_true() -> bool {
    true
}

/// Preferences consulted by the auto-detector when a tool has no asset pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionDefaults {
    #[serde(default = "default_true")]
    pub prefer_appimage: bool,
    #[serde(default)]
    pub libc: Libc,
    #[serde(default)]
    pub windows_abi: WindowsAbi,
}

impl Default for DetectionDefaults {
    fn default() -> Self {
        DetectionDefaults {
            prefer_appimage: true,
            libc: Libc::Musl,
            windows_abi: WindowsAbi::Msvc,
        }
    }
}

/// The YAML file as written.
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    pub tools_dir: Option<String>,
    pub platforms: Option<PlatformMatrix>,
    #[serde(default)]
    pub defaults: DetectionDefaults,
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub tools: BTreeMap<String, RawToolEntry>,
}

/// The loaded, normalized configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub tools_dir: PathBuf,
    pub platforms: PlatformMatrix,
    pub defaults: DetectionDefaults,
    pub max_workers: usize,
    pub tools: BTreeMap<String, ToolSpec>,
    /// Tools rejected by validation, with the reason.
    pub invalid_tools: BTreeMap<String, ResolveError>,
    /// The file this configuration came from, if any.
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_raw(RawConfig::default())
    }
}

impl Config {
    /// Normalizes a parsed file. Never fails: per-tool problems are collected.
    pub fn from_raw(raw: RawConfig) -> Self {
        let tools_dir = expand_path(raw.tools_dir.as_deref().unwrap_or(DEFAULT_TOOLS_DIR));
        let platforms = match raw.platforms {
            Some(p) if !p.is_empty() => p,
            _ => default_platforms(),
        };

        let mut tools = BTreeMap::new();
        let mut invalid_tools = BTreeMap::new();
        for (name, entry) in raw.tools {
            match ToolSpec::from_raw(&name, entry, &platforms) {
                Ok(spec) => {
                    tools.insert(name, spec);
                }
                Err(err) => {
                    log_error!("[Config] Tool '{}' is invalid: {}", name, err.reason());
                    invalid_tools.insert(name, err);
                }
            }
        }

        Config {
            tools_dir,
            platforms,
            defaults: raw.defaults,
            max_workers: raw.max_workers.unwrap_or(DEFAULT_MAX_WORKERS).max(1),
            tools,
            invalid_tools,
            config_path: None,
        }
    }

    /// Parses YAML text into a configuration.
    pub fn from_yaml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid, empty configuration.
        let raw: RawConfig = if contents.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
                path: origin.to_string(),
                source,
            })?
        };
        Ok(Config::from_raw(raw))
    }

    /// Reads and parses one configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg = Config::from_yaml_str(&contents, &path.display().to_string())?;
        cfg.config_path = Some(path.to_path_buf());
        Ok(cfg)
    }

    /// Loads the configuration from `explicit` or the first default location that exists.
    /// With no file at all, returns the default configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log_info!("[Config] Loading configuration from {}", path.display());
            return Config::from_file(path);
        }
        for candidate in default_config_locations() {
            log_debug!("[Config] Looking for configuration at {}", candidate.display());
            if candidate.is_file() {
                log_info!("[Config] Loading configuration from {}", candidate.display());
                return Config::from_file(&candidate);
            }
        }
        log_warn!("[Config] No configuration file found, using default settings");
        Ok(Config::default())
    }

    /// `<tools_dir>/<platform>/<arch>/bin`
    pub fn bin_dir(&self, platform: &str, arch: &str) -> PathBuf {
        bin_dir(&self.tools_dir, platform, arch)
    }
}

pub fn bin_dir(tools_dir: &Path, platform: &str, arch: &str) -> PathBuf {
    tools_dir.join(platform).join(arch).join("bin")
}

/// Search order for the configuration file when `--config` is not given.
pub fn default_config_locations() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("dotbins.yaml"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config").join("dotbins").join("config.yaml"));
        candidates.push(home.join(".config").join("dotbins.yaml"));
        candidates.push(home.join(".dotbins.yaml"));
        candidates.push(home.join(".dotbins").join("dotbins.yaml"));
    }
    candidates
}

/// Only the machine we run on.
fn default_platforms() -> PlatformMatrix {
    let (platform, arch) = current_platform();
    let mut m = PlatformMatrix::new();
    m.insert(platform, vec![arch]);
    m
}

/// Expands `~` and `$VARS`; falls back to the literal path when a variable is unset.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log_warn!("[Config] Could not expand '{}': {}. Using it literally.", raw, e);
            PathBuf::from(shellexpand::tilde(raw).as_ref())
        }
    }
}
