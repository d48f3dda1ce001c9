#![allow(dead_code)]

use dotbins::error::ResolveError;
use dotbins::libs::github::{AssetDownloader, ReleaseSource};
use dotbins::schemas::config::Config;
use dotbins::schemas::release::Release;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds a `.tar.gz` in memory; every file gets mode 0o755.
pub fn tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(enc);
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Builds a `.tar.xz` in memory.
pub fn tar_xz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let enc = xz2::write::XzEncoder::new(Vec::new(), 6);
    let mut builder = tar::Builder::new(enc);
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Builds a `.tar.bz2` in memory.
pub fn tar_bz2(files: &[(&str, &[u8])]) -> Vec<u8> {
    let enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    let mut builder = tar::Builder::new(enc);
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Builds a `.zip` whose `links` are symlinks (`(path, target)`) next to regular `files`.
pub fn zip_with_links(files: &[(&str, &[u8])], links: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::FileOptions::default().unix_permissions(0o755);
    for (path, data) in files {
        writer.start_file(*path, opts).unwrap();
        writer.write_all(data).unwrap();
    }
    for (path, target) in links {
        writer.add_symlink(*path, *target, opts).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Builds a `.zip` in memory.
pub fn zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::FileOptions::default().unix_permissions(0o755);
    for (path, data) in files {
        writer.start_file(*path, opts).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn url_for(repo: &str, asset: &str) -> String {
    format!("https://example.invalid/{repo}/{asset}")
}

/// A release whose asset URLs point into [`MockDownloader`].
pub fn release(repo: &str, tag: &str, assets: &[&str]) -> Release {
    Release::new(tag, assets.iter().map(|a| (a.to_string(), url_for(repo, a))))
}

/// Serves canned releases by repo.
#[derive(Default)]
pub struct MockReleases {
    releases: HashMap<String, Release>,
    pub calls: AtomicUsize,
}

impl MockReleases {
    pub fn with(mut self, repo: &str, release: Release) -> Self {
        self.releases.insert(repo.to_string(), release);
        self
    }
}

impl ReleaseSource for MockReleases {
    fn fetch_release(&self, repo: &str, _tag: Option<&str>) -> Result<Release, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.releases
            .get(repo)
            .cloned()
            .ok_or_else(|| ResolveError::Download(format!("{repo}: no releases found")))
    }
}

/// Serves canned bytes by URL; URLs in `failing` error like an exhausted retry loop.
#[derive(Default)]
pub struct MockDownloader {
    files: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    pub requested: Mutex<Vec<String>>,
}

impl MockDownloader {
    pub fn with(mut self, repo: &str, asset: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url_for(repo, asset), bytes);
        self
    }

    pub fn failing(mut self, repo: &str, asset: &str) -> Self {
        self.failing.insert(url_for(repo, asset));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

impl AssetDownloader for MockDownloader {
    fn download(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(ResolveError::Download(format!(
                "{url}: HTTP 503 (gave up after 3 attempts)"
            )));
        }
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| ResolveError::Download(format!("{url}: HTTP 404 not found")))
    }
}

/// Parses a config whose `tools_dir` points at `dir`.
pub fn config(dir: &Path, body: &str) -> Config {
    let yaml = format!("tools_dir: {}\n{}", dir.display(), body);
    Config::from_yaml_str(&yaml, "test").unwrap()
}
