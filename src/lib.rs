//! `dotbins` downloads pre-built CLI binaries from GitHub Releases into a
//! `<tools_dir>/<platform>/<arch>/bin` tree that can be committed to a dotfiles repo.
//!
//! The interesting part is the release-asset resolution engine in [`libs`]: given a
//! tool's configuration, a target platform/arch and a release's asset list, it picks
//! one asset, finds the binary inside it and writes it out.

pub mod error;
pub mod libs;
pub mod logger;
pub mod schemas;
