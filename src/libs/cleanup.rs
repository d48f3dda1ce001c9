// Removal of binaries that no configured tool produces any more (`sync --cleanup`).
//
// Only the `bin` directories of the matrix being synced are scanned, and only
// regular files and symlinks directly inside them are candidates. Nothing else
// under `tools_dir` is touched.

use crate::libs::utilities::platform::executable_file_name;
use crate::schemas::config::{PlatformMatrix, bin_dir};
use crate::schemas::tools::ToolSpec;
use crate::{log_debug, log_info, log_warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Files in the matrix's bin directories that match none of `tools`' binaries
/// and none of the `keep` names (e.g. tools whose configuration is invalid).
pub fn stale_binaries(
    tools_dir: &Path,
    platforms: &PlatformMatrix,
    tools: &BTreeMap<String, ToolSpec>,
    keep: &[&str],
) -> io::Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    for (platform, archs) in platforms {
        let expected: BTreeSet<String> = tools
            .values()
            .flat_map(|tool| tool.binaries.iter().map(|b| b.name.as_str()))
            .chain(keep.iter().copied())
            .map(|name| executable_file_name(name, platform))
            .collect();
        for arch in archs {
            let dir = bin_dir(tools_dir, platform, arch);
            let listing = match fs::read_dir(&dir) {
                Ok(listing) => listing,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            for entry in listing {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if !expected.contains(&name) {
                    stale.push(entry.path());
                }
            }
        }
    }
    stale.sort();
    Ok(stale)
}

/// Deletes [`stale_binaries`] and returns what was removed. A file that cannot
/// be deleted is logged and skipped.
pub fn remove_stale_binaries(
    tools_dir: &Path,
    platforms: &PlatformMatrix,
    tools: &BTreeMap<String, ToolSpec>,
    keep: &[&str],
) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in stale_binaries(tools_dir, platforms, tools, keep)? {
        match fs::remove_file(&path) {
            Ok(()) => {
                log_info!("[Cleanup] Removed {}", path.display());
                removed.push(path);
            }
            Err(e) => log_warn!("[Cleanup] Could not remove {}: {}", path.display(), e),
        }
    }
    if removed.is_empty() {
        log_debug!("[Cleanup] Nothing to remove under {}", tools_dir.display());
    }
    Ok(removed)
}
