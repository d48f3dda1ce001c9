mod common;

use common::*;
use dotbins::libs::cleanup;
use dotbins::libs::tool_resolver::{Outcome, Resolver, UnitResult, select_asset};
use dotbins::schemas::config::{Config, DetectionDefaults, PlatformMatrix};
use dotbins::schemas::state_file::VersionStore;
use dotbins::schemas::tools::ToolSpec;
use std::fs;
use std::sync::atomic::Ordering;

fn run(cfg: &Config, releases: &MockReleases, downloader: &MockDownloader, versions: &VersionStore, force: bool) -> Vec<UnitResult> {
    let resolver = Resolver {
        tools_dir: &cfg.tools_dir,
        defaults: &cfg.defaults,
        releases,
        downloader,
        versions,
        force,
        bin_dir: None,
    };
    let tools: Vec<&ToolSpec> = cfg.tools.values().collect();
    resolver.resolve_all(&tools, &cfg.platforms, cfg.max_workers)
}

fn matrix(platform: &str, arch: &str) -> PlatformMatrix {
    PlatformMatrix::from([(platform.to_string(), vec![arch.to_string()])])
}

fn installed_version(r: &UnitResult) -> Option<&str> {
    match &r.outcome {
        Outcome::Installed { version, .. } => Some(version),
        _ => None,
    }
}

#[test]
fn arch_map_scenario_selects_the_mapped_asset_and_installs_it() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        r#"
platforms:
  linux: [amd64]
tools:
  r:
    repo: o/r
    arch_map: {amd64: x86_64}
    asset_patterns: {linux: "r-{arch}.tar.gz"}
"#,
    );
    let rel = release("o/r", "v1.0.0", &["r-x86_64.tar.gz", "r-aarch64.tar.gz"]);

    let chosen = select_asset(&cfg.tools["r"], &rel, "linux", "amd64", &cfg.defaults)
        .unwrap()
        .unwrap();
    assert_eq!(chosen.asset.name, "r-x86_64.tar.gz");

    let releases = MockReleases::default().with("o/r", rel);
    let downloader = MockDownloader::default()
        .with("o/r", "r-x86_64.tar.gz", tar_gz(&[("r", b"amd64 build")]))
        .with("o/r", "r-aarch64.tar.gz", tar_gz(&[("r", b"arm64 build")]));
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);

    assert_eq!(results.len(), 1);
    assert_eq!(installed_version(&results[0]), Some("1.0.0"));
    let dest = dir.path().join("linux/amd64/bin/r");
    assert_eq!(fs::read(dest).unwrap(), b"amd64 build");
}

#[test]
fn null_pattern_is_unsupported_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        r#"
platforms:
  macos: [arm64]
  linux: [amd64]
tools:
  t:
    repo: o/t
    asset_patterns:
      macos: null
      linux: "t-linux.tar.gz"
"#,
    );
    let releases = MockReleases::default().with("o/t", release("o/t", "v2", &["t-linux.tar.gz"]));
    let downloader = MockDownloader::default().with("o/t", "t-linux.tar.gz", tar_gz(&[("t", b"bin")]));
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);

    let macos = results.iter().find(|r| r.platform == "macos").unwrap();
    assert_eq!(macos.outcome, Outcome::Unsupported);
    assert!(!macos.is_failure());
    let linux = results.iter().find(|r| r.platform == "linux").unwrap();
    assert_eq!(installed_version(linux), Some("2"));
}

#[test]
fn tool_unsupported_everywhere_never_fetches_its_release() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "platforms:\n  macos: [arm64]\ntools:\n  t:\n    repo: o/t\n    asset_patterns: {macos: null}\n");
    let releases = MockReleases::default();
    let results = run(&cfg, &releases, &MockDownloader::default(), &VersionStore::default(), false);
    assert_eq!(results[0].outcome, Outcome::Unsupported);
    assert_eq!(releases.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn tar_gz_entry_round_trips_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let source: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let cfg = config(
        dir.path(),
        "platforms:\n  linux: [amd64]\ntools:\n  tool:\n    repo: o/tool\n    path_in_archive: bin/tool\n    asset_patterns: tool.tar.gz\n",
    );
    let releases = MockReleases::default().with("o/tool", release("o/tool", "v1", &["tool.tar.gz"]));
    let downloader = MockDownloader::default().with(
        "o/tool",
        "tool.tar.gz",
        tar_gz(&[("README.md", b"docs"), ("bin/tool", &source)]),
    );
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert!(matches!(results[0].outcome, Outcome::Installed { .. }));
    assert_eq!(fs::read(dir.path().join("linux/amd64/bin/tool")).unwrap(), source);
}

#[test]
fn wildcard_path_in_archive_finds_the_binary() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        r#"
platforms:
  linux: [amd64]
tools:
  foo:
    repo: o/foo
    arch_map: {amd64: x86_64}
    path_in_archive: "foo-v{version}-{arch}-*/foo"
    asset_patterns: "foo-v{version}-{arch}-unknown-linux-gnu.tar.gz"
"#,
    );
    let asset = "foo-v1.2.3-x86_64-unknown-linux-gnu.tar.gz";
    let releases = MockReleases::default().with("o/foo", release("o/foo", "v1.2.3", &[asset]));
    let downloader = MockDownloader::default().with(
        "o/foo",
        asset,
        tar_gz(&[
            ("foo-v1.2.3-x86_64-unknown-linux-gnu/LICENSE", b"MIT"),
            ("foo-v1.2.3-x86_64-unknown-linux-gnu/foo", b"the binary"),
            ("foo-v1.2.3-x86_64-unknown-linux-gnu/doc/foo.1", b"man"),
        ]),
    );
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert_eq!(installed_version(&results[0]), Some("1.2.3"));
    assert_eq!(fs::read(dir.path().join("linux/amd64/bin/foo")).unwrap(), b"the binary");
}

#[test]
fn ten_concurrent_units_with_one_failing_download() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("platforms:\n  linux: [amd64]\nmax_workers: 4\ntools:\n");
    let mut releases = MockReleases::default();
    let mut downloader = MockDownloader::default();
    for i in 0..10 {
        let repo = format!("o/t{i}");
        let asset = format!("t{i}-linux-amd64.tar.gz");
        body.push_str(&format!("  t{i}: {repo}\n"));
        releases = releases.with(&repo, release(&repo, "v1.0.0", &[&asset]));
        downloader = if i == 7 {
            downloader.failing(&repo, &asset)
        } else {
            downloader.with(&repo, &asset, tar_gz(&[(&format!("t{i}"), format!("bin {i}").as_bytes())]))
        };
    }
    let cfg = config(dir.path(), &body);

    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert_eq!(results.len(), 10);

    let installed: Vec<&UnitResult> = results.iter().filter(|r| installed_version(r).is_some()).collect();
    let failed: Vec<&UnitResult> = results.iter().filter(|r| r.is_failure()).collect();
    assert_eq!(installed.len(), 9);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].tool, "t7");
    match &failed[0].outcome {
        Outcome::Failed(err) => assert_eq!(err.kind(), "DownloadError"),
        other => panic!("unexpected outcome {other:?}"),
    }

    // Every other unit got exactly its own bytes.
    for i in (0..10).filter(|i| *i != 7) {
        let written = fs::read(dir.path().join(format!("linux/amd64/bin/t{i}"))).unwrap();
        assert_eq!(written, format!("bin {i}").as_bytes());
    }
    assert!(!dir.path().join("linux/amd64/bin/t7").exists());
}

#[test]
fn release_fetch_failure_fails_every_unit_of_that_tool() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "platforms:\n  linux: [amd64, arm64]\ntools:\n  gone: o/gone\n");
    let results = run(&cfg, &MockReleases::default(), &MockDownloader::default(), &VersionStore::default(), false);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| matches!(&r.outcome, Outcome::Failed(e) if e.kind() == "DownloadError")));
}

#[test]
fn up_to_date_units_are_skipped_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "platforms:\n  linux: [amd64]\ntools:\n  t: o/t\n");
    let asset = "t-linux-amd64.tar.gz";
    let releases = MockReleases::default().with("o/t", release("o/t", "v3.1.0", &[asset]));
    let downloader = MockDownloader::default().with("o/t", asset, tar_gz(&[("t", b"v3")]));

    let first = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    let Outcome::Installed { version, asset: got, sha256, .. } = &first[0].outcome else {
        panic!("expected an install, got {:?}", first[0].outcome);
    };
    let mut store = VersionStore::load(&cfg.tools_dir);
    store.record("t", "linux", "amd64", version, got, sha256);
    store.save().unwrap();
    assert_eq!(downloader.request_count(), 1);

    let store = VersionStore::load(&cfg.tools_dir);
    let second = run(&cfg, &releases, &downloader, &store, false);
    assert_eq!(second[0].outcome, Outcome::UpToDate { version: "3.1.0".into() });
    assert_eq!(downloader.request_count(), 1);

    let forced = run(&cfg, &releases, &downloader, &store, true);
    assert!(matches!(forced[0].outcome, Outcome::Installed { .. }));
    assert_eq!(downloader.request_count(), 2);

    // A missing binary also forces a reinstall.
    fs::remove_file(dir.path().join("linux/amd64/bin/t")).unwrap();
    let repaired = run(&cfg, &releases, &downloader, &store, false);
    assert!(matches!(repaired[0].outcome, Outcome::Installed { .. }));
}

#[test]
fn auto_detection_end_to_end_across_platforms() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "platforms:\n  linux: [amd64]\n  windows: [amd64]\ntools:\n  rg:\n    repo: BurntSushi/ripgrep\n",
    );
    let assets = [
        "ripgrep-14.1.0-x86_64-unknown-linux-gnu.tar.gz",
        "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz",
        "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz.sha256",
        "ripgrep-14.1.0-x86_64-pc-windows-msvc.zip",
    ];
    let repo = "BurntSushi/ripgrep";
    let releases = MockReleases::default().with(repo, release(repo, "14.1.0", &assets));
    let downloader = MockDownloader::default()
        .with(repo, assets[0], tar_gz(&[("ripgrep-14.1.0-x86_64-unknown-linux-gnu/rg", b"gnu")]))
        .with(repo, assets[1], tar_gz(&[("ripgrep-14.1.0-x86_64-unknown-linux-musl/rg", b"musl")]))
        .with(repo, assets[3], zip(&[("ripgrep-14.1.0-x86_64-pc-windows-msvc/rg.exe", b"MZ")]));

    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert!(results.iter().all(|r| !r.is_failure()), "{results:?}");
    assert_eq!(fs::read(dir.path().join("linux/amd64/bin/rg")).unwrap(), b"musl");
    assert_eq!(fs::read(dir.path().join("windows/amd64/bin/rg.exe")).unwrap(), b"MZ");
}

#[test]
fn libc_default_can_be_flipped_in_config() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "platforms:\n  linux: [amd64]\ndefaults:\n  libc: glibc\ntools:\n  t: o/t\n");
    let rel = release("o/t", "v1", &["t-x86_64-unknown-linux-musl.tar.gz", "t-x86_64-unknown-linux-gnu.tar.gz"]);
    let chosen = select_asset(&cfg.tools["t"], &rel, "linux", "amd64", &cfg.defaults)
        .unwrap()
        .unwrap();
    assert_eq!(chosen.asset.name, "t-x86_64-unknown-linux-gnu.tar.gz");
    assert!(chosen.auto_detected);
}

#[test]
fn appimage_is_copied_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "platforms:\n  linux: [amd64]\ntools:\n  nvim: neovim/neovim\n");
    let assets = ["nvim-linux-x86_64.tar.gz", "nvim-linux-x86_64.appimage"];
    let releases = MockReleases::default().with("neovim/neovim", release("neovim/neovim", "v0.11.0", &assets));
    let downloader = MockDownloader::default()
        .with("neovim/neovim", assets[0], tar_gz(&[("nvim-linux-x86_64/bin/nvim", b"tarball")]))
        .with("neovim/neovim", assets[1], b"appimage bytes".to_vec());

    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    match &results[0].outcome {
        Outcome::Installed { asset, .. } => assert_eq!(asset, "nvim-linux-x86_64.appimage"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fs::read(dir.path().join("linux/amd64/bin/nvim")).unwrap(), b"appimage bytes");
}

#[test]
fn multiple_binaries_and_xz_archives() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        r#"
platforms:
  linux: [arm64]
tools:
  uv:
    repo: astral-sh/uv
    binary_name: [uv, uvx]
    path_in_archive: ["*/uv", "*/uvx"]
    asset_patterns: "uv-{arch}-unknown-linux-musl.tar.xz"
    arch_map: {arm64: aarch64}
"#,
    );
    let asset = "uv-aarch64-unknown-linux-musl.tar.xz";
    let releases = MockReleases::default().with("astral-sh/uv", release("astral-sh/uv", "0.6.0", &[asset]));
    let downloader = MockDownloader::default().with(
        "astral-sh/uv",
        asset,
        tar_xz(&[("uv-aarch64-unknown-linux-musl/uv", b"uv"), ("uv-aarch64-unknown-linux-musl/uvx", b"uvx")]),
    );
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    match &results[0].outcome {
        Outcome::Installed { binaries, .. } => assert_eq!(binaries.len(), 2),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fs::read(dir.path().join("linux/arm64/bin/uv")).unwrap(), b"uv");
    assert_eq!(fs::read(dir.path().join("linux/arm64/bin/uvx")).unwrap(), b"uvx");
}

#[test]
fn per_unit_errors_carry_their_kind() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        r#"
platforms:
  linux: [amd64]
tools:
  corrupt:
    repo: o/corrupt
    asset_patterns: corrupt.tar.gz
  missing:
    repo: o/missing
    path_in_archive: bin/missing
    asset_patterns: missing.tar.gz
  raw:
    repo: o/raw
    extract_archive: true
    asset_patterns: raw-linux-amd64
  nomatch:
    repo: o/nomatch
    asset_patterns: "nomatch-{version}.zip"
"#,
    );
    let releases = MockReleases::default()
        .with("o/corrupt", release("o/corrupt", "v1", &["corrupt.tar.gz"]))
        .with("o/missing", release("o/missing", "v1", &["missing.tar.gz"]))
        .with("o/raw", release("o/raw", "v1", &["raw-linux-amd64"]))
        .with("o/nomatch", release("o/nomatch", "v1", &["nomatch-2.zip"]));
    let downloader = MockDownloader::default()
        .with("o/corrupt", "corrupt.tar.gz", b"not an archive".to_vec())
        .with("o/missing", "missing.tar.gz", tar_gz(&[("bin/other", b"x")]))
        .with("o/raw", "raw-linux-amd64", b"ELF".to_vec());

    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    let kind = |tool: &str| -> &'static str {
        match &results.iter().find(|r| r.tool == tool).unwrap().outcome {
            Outcome::Failed(err) => err.kind(),
            other => panic!("{tool}: unexpected outcome {other:?}"),
        }
    };
    assert_eq!(kind("corrupt"), "ExtractionError");
    assert_eq!(kind("missing"), "BinaryNotFound");
    assert_eq!(kind("raw"), "ExtractionError");
    assert_eq!(kind("nomatch"), "AssetNotFound");
    assert!(!dir.path().join("linux/amd64/bin/missing").exists());
}

#[test]
fn invalid_tools_do_not_block_valid_ones() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "platforms:\n  linux: [amd64]\ntools:\n  bad:\n    repo: o/bad\n    asset_patterns: 'bad-{flavor}.zip'\n  good: o/good\n",
    );
    assert_eq!(cfg.invalid_tools["bad"].kind(), "ConfigurationError");
    let releases = MockReleases::default().with("o/good", release("o/good", "v1", &["good-linux-amd64"]));
    let downloader = MockDownloader::default().with("o/good", "good-linux-amd64", b"ELF".to_vec());
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert_eq!(results.len(), 1);
    assert_eq!(installed_version(&results[0]), Some("1"));
}

#[test]
fn defaults_struct_matches_documented_values() {
    let d = DetectionDefaults::default();
    assert!(d.prefer_appimage);
}

#[test]
fn platform_null_covers_arches_outside_the_configured_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "platforms:\n  linux: [amd64]\ntools:\n  t:\n    repo: o/t\n    asset_patterns: {linux: null}\n",
    );
    let releases = MockReleases::default().with("o/t", release("o/t", "v1", &["t-linux-riscv64"]));
    let downloader = MockDownloader::default();
    let resolver = Resolver {
        tools_dir: &cfg.tools_dir,
        defaults: &cfg.defaults,
        releases: &releases,
        downloader: &downloader,
        versions: &VersionStore::default(),
        force: false,
        bin_dir: None,
    };
    let tools: Vec<&ToolSpec> = cfg.tools.values().collect();
    let results = resolver.resolve_all(&tools, &matrix("linux", "riscv64"), 2);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].arch, "riscv64");
    assert_eq!(results[0].outcome, Outcome::Unsupported);
    assert_eq!(releases.calls.load(Ordering::SeqCst), 0);
    assert_eq!(downloader.request_count(), 0);
}

#[test]
fn tar_bz2_asset_installs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "platforms:\n  linux: [amd64]\ntools:\n  tool:\n    repo: o/tool\n    asset_patterns: \"tool-{version}-{platform}-{arch}.tar.bz2\"\n",
    );
    let asset = "tool-2.1.0-linux-amd64.tar.bz2";
    let releases = MockReleases::default().with("o/tool", release("o/tool", "v2.1.0", &[asset]));
    let downloader = MockDownloader::default().with(
        "o/tool",
        asset,
        tar_bz2(&[("tool-2.1.0/LICENSE", b"MIT"), ("tool-2.1.0/tool", b"bz2 build")]),
    );
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert_eq!(installed_version(&results[0]), Some("2.1.0"));
    assert_eq!(fs::read(dir.path().join("linux/amd64/bin/tool")).unwrap(), b"bz2 build");
}

#[test]
fn zip_symlink_to_the_binary_is_followed() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "platforms:\n  macos: [arm64]\ntools:\n  tool:\n    repo: o/tool\n    path_in_archive: pkg/bin/tool\n    asset_patterns: tool-macos.zip\n",
    );
    let releases = MockReleases::default().with("o/tool", release("o/tool", "v3", &["tool-macos.zip"]));
    let downloader = MockDownloader::default().with(
        "o/tool",
        "tool-macos.zip",
        zip_with_links(&[("pkg/libexec/tool-3", b"mach-o")], &[("pkg/bin/tool", "../libexec/tool-3")]),
    );
    let results = run(&cfg, &releases, &downloader, &VersionStore::default(), false);
    assert_eq!(installed_version(&results[0]), Some("3"));
    assert_eq!(fs::read(dir.path().join("macos/arm64/bin/tool")).unwrap(), b"mach-o");
}

#[test]
fn bin_dir_override_installs_straight_into_the_destination() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("local-bin");
    let cfg = config(dir.path().join("unused").as_path(), "platforms:\n  linux: [amd64]\ntools:\n  fzf: junegunn/fzf\n");
    let releases = MockReleases::default().with("junegunn/fzf", release("junegunn/fzf", "v0.60.0", &["fzf-0.60.0-linux_amd64.tar.gz"]));
    let downloader = MockDownloader::default().with(
        "junegunn/fzf",
        "fzf-0.60.0-linux_amd64.tar.gz",
        tar_gz(&[("fzf", b"fzf build")]),
    );
    let mut versions = VersionStore::default();
    versions.record("fzf", "linux", "amd64", "0.60.0", "fzf-0.60.0-linux_amd64.tar.gz", "x");
    let resolver = Resolver {
        tools_dir: &cfg.tools_dir,
        defaults: &cfg.defaults,
        releases: &releases,
        downloader: &downloader,
        versions: &versions,
        force: true,
        bin_dir: Some(&dest),
    };
    let tools: Vec<&ToolSpec> = cfg.tools.values().collect();
    let results = resolver.resolve_all(&tools, &cfg.platforms, 1);

    assert_eq!(installed_version(&results[0]), Some("0.60.0"));
    assert_eq!(fs::read(dest.join("fzf")).unwrap(), b"fzf build");
    assert!(!dir.path().join("unused/linux/amd64/bin/fzf").exists());
}

#[test]
fn cleanup_after_sync_drops_tools_removed_from_the_config() {
    let dir = tempfile::tempdir().unwrap();
    let before = config(dir.path(), "platforms:\n  linux: [amd64]\ntools:\n  alpha: o/a\n  beta: o/b\n");
    let releases = MockReleases::default()
        .with("o/a", release("o/a", "v1", &["alpha-linux-amd64"]))
        .with("o/b", release("o/b", "v1", &["beta-linux-amd64"]));
    let downloader = MockDownloader::default()
        .with("o/a", "alpha-linux-amd64", b"a".to_vec())
        .with("o/b", "beta-linux-amd64", b"b".to_vec());
    let mut versions = VersionStore::default();
    for r in run(&before, &releases, &downloader, &VersionStore::default(), false) {
        if let Outcome::Installed { version, asset, sha256, .. } = &r.outcome {
            versions.record(&r.tool, &r.platform, &r.arch, version, asset, sha256);
        }
    }
    let bin = before.bin_dir("linux", "amd64");
    assert!(bin.join("alpha").is_file() && bin.join("beta").is_file());

    let after = config(dir.path(), "platforms:\n  linux: [amd64]\ntools:\n  alpha: o/a\n");
    let removed = cleanup::remove_stale_binaries(&after.tools_dir, &after.platforms, &after.tools, &[]).unwrap();
    let dropped = versions.retain_tools(|t| after.tools.contains_key(t));

    assert_eq!(removed, vec![bin.join("beta")]);
    assert!(bin.join("alpha").is_file());
    assert_eq!(dropped, vec!["beta/linux/amd64".to_string()]);
    assert!(versions.get("alpha", "linux", "amd64").is_some());
}
