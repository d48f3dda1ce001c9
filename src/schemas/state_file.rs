//! # Version Store (`versions.json`)
//!
//! Records which release of each tool is installed for every platform/arch cell
//! of the tools directory. `dotbins sync` consults it to skip units that are
//! already current and updates it from the resolution outcomes afterwards.
//!
//! ## Example
//! ```json
//! {
//!   "ripgrep/linux/amd64": {
//!     "version": "14.1.0",
//!     "updated_at": "2026-10-19T08:12:44.120551+00:00",
//!     "sha256": "4cf9f2741e6c465ffdb7c26f38056a59e2a2544b51f7cc128ef28337eeae4d8e",
//!     "asset": "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz"
//!   }
//! }
//! ```
//!
//! The file lives at `<tools_dir>/versions.json`, is written atomically, and is
//! keyed `tool/platform/arch`. A BTreeMap keeps the keys sorted on disk.

use crate::{log_debug, log_warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const VERSIONS_FILE: &str = "versions.json";

/// What is installed for one `tool/platform/arch` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Release version, without the leading `v`.
    pub version: String,
    /// RFC 3339 timestamp of the install.
    pub updated_at: String,
    /// SHA-256 of the downloaded asset. Recorded, never verified.
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub asset: String,
}

/// The loaded `versions.json`.
#[derive(Debug, Clone, Default)]
pub struct VersionStore {
    path: PathBuf,
    entries: BTreeMap<String, VersionEntry>,
}

impl VersionStore {
    pub fn key(tool: &str, platform: &str, arch: &str) -> String {
        format!("{tool}/{platform}/{arch}")
    }

    /// Loads `<tools_dir>/versions.json`.
    pub fn load(tools_dir: &Path) -> Self {
        Self::load_from(tools_dir.join(VERSIONS_FILE))
    }

    /// Loads a store from `path`. A missing file is an empty store; an unreadable
    /// or corrupt one is an empty store plus a warning (it is rewritten on save).
    pub fn load_from(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    log_warn!("[Versions] Ignoring corrupt {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log_debug!("[Versions] No version file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log_warn!("[Versions] Could not read {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        VersionStore { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, tool: &str, platform: &str, arch: &str) -> Option<&VersionEntry> {
        self.entries.get(&Self::key(tool, platform, arch))
    }

    /// Records an install, stamped with the current time.
    pub fn record(&mut self, tool: &str, platform: &str, arch: &str, version: &str, asset: &str, sha256: &str) {
        self.entries.insert(
            Self::key(tool, platform, arch),
            VersionEntry {
                version: version.to_string(),
                updated_at: chrono::Utc::now().to_rfc3339(),
                sha256: sha256.to_string(),
                asset: asset.to_string(),
            },
        );
    }

    /// All entries, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &VersionEntry)> {
        self.entries.iter()
    }

    /// Drops every entry whose tool fails `keep`; returns the removed keys.
    pub fn retain_tools(&mut self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let removed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| !keep(key.split('/').next().unwrap_or_default()))
            .cloned()
            .collect();
        for key in &removed {
            self.entries.remove(key);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the store as pretty JSON through a temporary file in the same directory.
    pub fn save(&self) -> io::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let json = serde_json::to_string_pretty(&self.entries).map_err(io::Error::other)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        log_debug!("[Versions] Saved {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}
