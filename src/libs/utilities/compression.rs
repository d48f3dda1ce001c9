// This module reads downloaded release assets in memory. It picks a
// decompression strategy from the asset's filename, lists the entries of an
// archive for the binary locator, and pulls single entries out as bytes.
//
// Nothing is unpacked to disk here: only the binaries the locator selects are
// written out, by `utilities::binary`.

use crate::error::ResolveError;
use crate::log_debug;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use tar::Archive;
use xz2::read::XzDecoder;
use zip::ZipArchive;

/// Upper bound on symlink hops followed inside one archive.
const MAX_LINK_DEPTH: usize = 8;

/// Unix file-type bits of a symlink, as stored in zip external attributes.
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// How an asset is unpacked, decided by filename extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarBz2,
    TarXz,
    Tar,
    /// A single gzip-compressed file (not a tarball).
    Gz,
    Bz2,
    Xz,
    /// Not an archive: the downloaded file is the binary (plain executables, AppImages).
    Raw,
}

impl ArchiveFormat {
    /// Maps a filename to its format. Matching is case-insensitive on the suffix.
    ///
    /// # Example
    /// ```text
    /// "bat-v0.24.0-x86_64-unknown-linux-musl.tar.gz" -> TarGz
    /// "nvim.appimage"                                  -> Raw
    /// ```
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_lowercase();
        let ends = |suffixes: &[&str]| suffixes.iter().any(|s| lower.ends_with(s));
        if ends(&[".tar.gz", ".tgz"]) {
            ArchiveFormat::TarGz
        } else if ends(&[".tar.bz2", ".tbz2", ".tbz"]) {
            ArchiveFormat::TarBz2
        } else if ends(&[".tar.xz", ".txz"]) {
            ArchiveFormat::TarXz
        } else if ends(&[".tar"]) {
            ArchiveFormat::Tar
        } else if ends(&[".zip"]) {
            ArchiveFormat::Zip
        } else if ends(&[".gz"]) {
            ArchiveFormat::Gz
        } else if ends(&[".bz2"]) {
            ArchiveFormat::Bz2
        } else if ends(&[".xz"]) {
            ArchiveFormat::Xz
        } else {
            ArchiveFormat::Raw
        }
    }
}

/// What an archive entry is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symbolic or hard link, with its raw target.
    Link(String),
}

/// One entry of an archive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Normalized path: `/`-separated, no leading `./`, no trailing `/`.
    pub path: String,
    pub kind: EntryKind,
    /// Unix permission bits, when the archive records them.
    pub mode: Option<u32>,
}

impl ArchiveEntry {
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of directories above the entry (`a/b/c` is depth 2).
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }

    pub fn is_executable(&self) -> bool {
        self.kind != EntryKind::Dir && self.mode.is_some_and(|m| m & 0o111 != 0)
    }
}

/// Normalizes an archive path: backslashes to `/`, strips `./` prefixes and trailing `/`.
pub fn normalize_entry_path(path: &str) -> String {
    let mut p = path.replace('\\', "/");
    while let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    p.trim_end_matches('/').to_string()
}

/// Resolves a link target relative to the directory holding `link_path`.
fn resolve_link(link_path: &str, target: &str, hard: bool) -> String {
    let base = if hard || target.starts_with('/') {
        String::new()
    } else {
        link_path.rsplit_once('/').map(|(dir, _)| dir.to_string()).unwrap_or_default()
    };
    let mut parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

enum Lookup {
    Data(Vec<u8>),
    Link(String),
    Missing,
}

/// An in-memory view of a downloaded asset.
pub struct AssetArchive<'a> {
    name: &'a str,
    format: ArchiveFormat,
    bytes: &'a [u8],
}

impl<'a> AssetArchive<'a> {
    /// Wraps downloaded bytes; the format comes from `name`.
    pub fn new(name: &'a str, bytes: &'a [u8]) -> Self {
        Self::with_format(name, ArchiveFormat::from_filename(name), bytes)
    }

    pub fn with_format(name: &'a str, format: ArchiveFormat, bytes: &'a [u8]) -> Self {
        AssetArchive { name, format, bytes }
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    fn corrupt(&self, err: impl std::fmt::Display) -> ResolveError {
        ResolveError::Extraction(format!("{}: {}", self.name, err))
    }

    /// The entry name of a single-file asset: the filename minus its compression suffix.
    fn single_entry_name(&self) -> String {
        let lower = self.name.to_lowercase();
        for suffix in [".gz", ".bz2", ".xz"] {
            if lower.ends_with(suffix) {
                return self.name[..self.name.len() - suffix.len()].to_string();
            }
        }
        self.name.to_string()
    }

    fn decoder(&self) -> Box<dyn Read + 'a> {
        match self.format {
            ArchiveFormat::TarGz | ArchiveFormat::Gz => Box::new(GzDecoder::new(self.bytes)),
            ArchiveFormat::TarBz2 | ArchiveFormat::Bz2 => Box::new(BzDecoder::new(self.bytes)),
            ArchiveFormat::TarXz | ArchiveFormat::Xz => Box::new(XzDecoder::new(self.bytes)),
            ArchiveFormat::Tar | ArchiveFormat::Zip | ArchiveFormat::Raw => Box::new(self.bytes),
        }
    }

    fn decompress_all(&self) -> Result<Vec<u8>, ResolveError> {
        let mut out = Vec::new();
        self.decoder().read_to_end(&mut out).map_err(|e| self.corrupt(e))?;
        Ok(out)
    }

    /// Lists every entry. Single-file assets list exactly one entry.
    ///
    /// # Errors
    /// `ResolveError::Extraction` when the archive cannot be read.
    pub fn entries(&self) -> Result<Vec<ArchiveEntry>, ResolveError> {
        let entries = match self.format {
            ArchiveFormat::Zip => self.zip_entries()?,
            ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz | ArchiveFormat::Tar => {
                self.tar_entries()?
            }
            ArchiveFormat::Gz | ArchiveFormat::Bz2 | ArchiveFormat::Xz | ArchiveFormat::Raw => {
                vec![ArchiveEntry {
                    path: self.single_entry_name(),
                    kind: EntryKind::File,
                    mode: None,
                }]
            }
        };
        log_debug!("[Archive] {} ({:?}) lists {} entries", self.name, self.format, entries.len());
        Ok(entries)
    }

    /// Reads one entry as bytes, following links inside the archive.
    ///
    /// # Errors
    /// `ResolveError::BinaryNotFound` when `path` is absent (or a link points nowhere),
    /// `ResolveError::Extraction` when the archive is corrupt or links loop.
    pub fn read_entry(&self, path: &str) -> Result<Vec<u8>, ResolveError> {
        let mut wanted = normalize_entry_path(path);
        for _ in 0..=MAX_LINK_DEPTH {
            let found = match self.format {
                ArchiveFormat::Zip => self.zip_lookup(&wanted)?,
                ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz | ArchiveFormat::Tar => {
                    self.tar_lookup(&wanted)?
                }
                ArchiveFormat::Gz | ArchiveFormat::Bz2 | ArchiveFormat::Xz | ArchiveFormat::Raw => {
                    if wanted == self.single_entry_name() {
                        Lookup::Data(self.decompress_all()?)
                    } else {
                        Lookup::Missing
                    }
                }
            };
            match found {
                Lookup::Data(data) => return Ok(data),
                Lookup::Link(next) => {
                    log_debug!("[Archive] Following link {} -> {}", wanted, next);
                    wanted = next;
                }
                Lookup::Missing => {
                    return Err(ResolveError::BinaryNotFound(format!(
                        "'{}' is not in {}",
                        wanted, self.name
                    )));
                }
            }
        }
        Err(self.corrupt(format!("more than {MAX_LINK_DEPTH} links while reading '{path}'")))
    }

    fn zip_archive(&self) -> Result<ZipArchive<Cursor<&'a [u8]>>, ResolveError> {
        ZipArchive::new(Cursor::new(self.bytes)).map_err(|e| self.corrupt(e))
    }

    fn zip_entries(&self) -> Result<Vec<ArchiveEntry>, ResolveError> {
        let mut zip = self.zip_archive()?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).map_err(|e| self.corrupt(e))?;
            let path = normalize_entry_path(file.name());
            let mode = file.unix_mode();
            let kind = if file.is_dir() {
                EntryKind::Dir
            } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
                let mut target = String::new();
                file.read_to_string(&mut target).map_err(|e| self.corrupt(e))?;
                EntryKind::Link(target)
            } else {
                EntryKind::File
            };
            entries.push(ArchiveEntry { path, kind, mode });
        }
        Ok(entries)
    }

    fn zip_lookup(&self, wanted: &str) -> Result<Lookup, ResolveError> {
        let mut zip = self.zip_archive()?;
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).map_err(|e| self.corrupt(e))?;
            if file.is_dir() || normalize_entry_path(file.name()) != wanted {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(|e| self.corrupt(e))?;
            if file.unix_mode().is_some_and(|m| m & S_IFMT == S_IFLNK) {
                let target = String::from_utf8_lossy(&data).to_string();
                return Ok(Lookup::Link(resolve_link(wanted, &target, false)));
            }
            return Ok(Lookup::Data(data));
        }
        Ok(Lookup::Missing)
    }

    fn tar_entries(&self) -> Result<Vec<ArchiveEntry>, ResolveError> {
        let mut archive = Archive::new(self.decoder());
        let mut entries = Vec::new();
        for entry in archive.entries().map_err(|e| self.corrupt(e))? {
            let entry = entry.map_err(|e| self.corrupt(e))?;
            let header = entry.header();
            let entry_type = header.entry_type();
            let path = normalize_entry_path(&entry.path().map_err(|e| self.corrupt(e))?.to_string_lossy());
            let kind = if entry_type.is_dir() {
                EntryKind::Dir
            } else if entry_type.is_symlink() || entry_type.is_hard_link() {
                let target = entry
                    .link_name()
                    .map_err(|e| self.corrupt(e))?
                    .map(|t| t.to_string_lossy().to_string())
                    .unwrap_or_default();
                EntryKind::Link(target)
            } else if entry_type.is_file() {
                EntryKind::File
            } else {
                // pax headers, devices, fifos
                continue;
            };
            if path.is_empty() {
                continue;
            }
            entries.push(ArchiveEntry {
                path,
                kind,
                mode: header.mode().ok(),
            });
        }
        Ok(entries)
    }

    fn tar_lookup(&self, wanted: &str) -> Result<Lookup, ResolveError> {
        let mut archive = Archive::new(self.decoder());
        for entry in archive.entries().map_err(|e| self.corrupt(e))? {
            let mut entry = entry.map_err(|e| self.corrupt(e))?;
            let path = normalize_entry_path(&entry.path().map_err(|e| self.corrupt(e))?.to_string_lossy());
            if path != wanted {
                continue;
            }
            let entry_type = entry.header().entry_type();
            if entry_type.is_symlink() || entry_type.is_hard_link() {
                let target = entry
                    .link_name()
                    .map_err(|e| self.corrupt(e))?
                    .map(|t| t.to_string_lossy().to_string())
                    .unwrap_or_default();
                return Ok(Lookup::Link(resolve_link(wanted, &target, entry_type.is_hard_link())));
            }
            if !entry_type.is_file() {
                continue;
            }
            let mut data = Vec::new();
            entry.read_to_end(&mut data).map_err(|e| self.corrupt(e))?;
            return Ok(Lookup::Data(data));
        }
        Ok(Lookup::Missing)
    }
}
