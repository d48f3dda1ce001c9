// Writing resolved binaries into the tools directory.
//
// Every binary goes through a temporary file in the destination directory and is
// renamed into place, so the live path only ever holds a complete file.

use crate::error::ResolveError;
use crate::log_debug;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Writes `bytes` to `dest` atomically and marks the result executable.
///
/// # Arguments
/// * `dest`: Final path of the binary, e.g. `~/.dotbins/linux/amd64/bin/rg`.
/// * `bytes`: File contents.
///
/// # Returns
/// * `Err(ResolveError::Extraction)` when the directory cannot be created or the
///   temporary file cannot be written or renamed. The live path is untouched in that case.
pub fn write_binary_atomic(dest: &Path, bytes: &[u8]) -> Result<(), ResolveError> {
    let failed = |e: io::Error| ResolveError::Extraction(format!("cannot write {}: {}", dest.display(), e));
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(failed)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(failed)?;
    tmp.write_all(bytes).map_err(failed)?;
    tmp.as_file().sync_all().map_err(failed)?;
    make_executable(tmp.path()).map_err(failed)?;
    tmp.persist(dest).map_err(|e| failed(e.error))?;

    log_debug!("[Install] Wrote {} ({} bytes)", dest.display(), bytes.len());
    Ok(())
}

/// Sets `0o755` on `path`. Archives and raw downloads do not reliably carry the bit.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

/// No-op: Windows has no executable bit.
#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
