//! # Binary Location
//!
//! Finds the archive entry holding a tool's binary, either from a configured
//! `path_in_archive` pattern (already expanded by [`crate::libs::pattern::expand`])
//! or by scanning the listing for the binary's name.

use crate::error::ResolveError;
use crate::libs::pattern;
use crate::libs::utilities::compression::{normalize_entry_path, ArchiveEntry, EntryKind};
use crate::log_debug;

/// Suffixes a binary may carry in the archive beyond its logical name.
const EXECUTABLE_SUFFIXES: &[&str] = &[".exe", ".appimage"];

fn files(entries: &[ArchiveEntry]) -> impl Iterator<Item = &ArchiveEntry> {
    entries.iter().filter(|e| e.kind != EntryKind::Dir)
}

fn listing_hint(entries: &[ArchiveEntry]) -> String {
    let shown: Vec<&str> = files(entries).take(10).map(|e| e.path.as_str()).collect();
    let total = files(entries).count();
    if total > shown.len() {
        format!("[{}, ... {} more]", shown.join(", "), total - shown.len())
    } else {
        format!("[{}]", shown.join(", "))
    }
}

/// First matching file with the fewest parent directories.
fn shallowest(entries: &[ArchiveEntry], pred: impl Fn(&ArchiveEntry) -> bool) -> Option<String> {
    files(entries)
        .filter(|e| pred(*e))
        .min_by_key(|e| e.depth())
        .map(|e| e.path.clone())
}

/// Locates the entry for `binary_name` using an expanded in-archive pattern.
///
/// With wildcards, several entries may match: an entry whose basename equals
/// `binary_name` wins, otherwise the first match in listing order. Without
/// wildcards the pattern must equal an entry path (after normalizing `./`).
///
/// # Errors
/// `ResolveError::BinaryNotFound` when nothing matches.
pub fn locate(entries: &[ArchiveEntry], path_pattern: &str, binary_name: &str) -> Result<String, ResolveError> {
    let wanted = normalize_entry_path(path_pattern);

    let found = if pattern::has_wildcards(&wanted) {
        let glob = pattern::Glob::new(&wanted)?;
        let matching: Vec<&ArchiveEntry> = files(entries).filter(|e| glob.is_match(&e.path)).collect();
        if matching.len() > 1 {
            log_debug!(
                "[Locate] Pattern '{}' matches {} entries, preferring basename '{}'",
                wanted,
                matching.len(),
                binary_name
            );
        }
        matching
            .iter()
            .find(|e| e.basename() == binary_name)
            .or_else(|| matching.first())
            .map(|e| e.path.clone())
    } else {
        files(entries).find(|e| e.path == wanted).map(|e| e.path.clone())
    };

    found.ok_or_else(|| {
        ResolveError::BinaryNotFound(format!(
            "no entry matches '{}' for binary '{}' in {}",
            wanted,
            binary_name,
            listing_hint(entries)
        ))
    })
}

/// Finds `binary_name` without a configured path.
///
/// Tried in order, each step preferring shallower entries and then listing order:
/// 1. basename equal to `binary_name`
/// 2. basename equal to `binary_name` plus `.exe` or `.appimage` (any case)
/// 3. the only executable whose basename contains `binary_name`, looking under a
///    `bin/` directory first
/// 4. the only file of a single-entry archive
///
/// # Errors
/// `ResolveError::BinaryNotFound` when no step yields a unique entry.
pub fn auto_detect(entries: &[ArchiveEntry], binary_name: &str) -> Result<String, ResolveError> {
    if let Some(path) = shallowest(entries, |e| e.basename() == binary_name) {
        log_debug!("[Locate] Found '{}' by exact name at {}", binary_name, path);
        return Ok(path);
    }

    let lower_name = binary_name.to_lowercase();
    if let Some(path) = shallowest(entries, |e| {
        let base = e.basename().to_lowercase();
        EXECUTABLE_SUFFIXES
            .iter()
            .any(|suffix| base.strip_suffix(suffix) == Some(lower_name.as_str()))
    }) {
        log_debug!("[Locate] Found '{}' with executable suffix at {}", binary_name, path);
        return Ok(path);
    }

    let partial: Vec<&ArchiveEntry> = files(entries)
        .filter(|e| e.is_executable() && e.basename().to_lowercase().contains(&lower_name))
        .collect();
    let in_bin: Vec<&&ArchiveEntry> = partial
        .iter()
        .filter(|e| e.path.starts_with("bin/") || e.path.contains("/bin/"))
        .collect();
    let unique = match (in_bin.as_slice(), partial.as_slice()) {
        ([only], _) => Some(only.path.clone()),
        (_, [only]) => Some(only.path.clone()),
        _ => None,
    };
    if let Some(path) = unique {
        log_debug!("[Locate] Found '{}' as the only matching executable at {}", binary_name, path);
        return Ok(path);
    }

    let all: Vec<&ArchiveEntry> = files(entries).collect();
    if let [only] = all.as_slice() {
        log_debug!("[Locate] Using the single entry {} for '{}'", only.path, binary_name);
        return Ok(only.path.clone());
    }

    Err(ResolveError::BinaryNotFound(format!(
        "could not find binary '{}' in {}",
        binary_name,
        listing_hint(entries)
    )))
}
