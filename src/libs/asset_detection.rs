//! # Asset Auto-Detection
//!
//! Picks a release asset for a `(platform, arch)` target when the tool has no
//! explicit asset pattern.
//!
//! The heuristic is an ordered list of named [`ScoringRule`]s. Every rule looks at
//! one asset and returns either a signed weight or a hard reject with a reason.
//! An asset's score is the sum of its weights; the first reject stops scoring for
//! that asset. The highest score wins and ties go to the asset listed first in the
//! release.
//!
//! | rule            | effect                                                             |
//! |-----------------|--------------------------------------------------------------------|
//! | `metadata`      | rejects checksum, signature and SBOM files                         |
//! | `platform`      | +100 on the target OS keyword, reject otherwise                   |
//! | `arch`          | +100 on the target arch keyword, reject on a foreign arch          |
//! | `format`        | +30 archives, +20 single-file compressed, +10 unknown, -20 packages |
//! | `appimage`      | +60 for `.AppImage` on Linux when `prefer_appimage` is on         |
//! | `libc`          | +20 for the preferred libc flavor (Linux only)                     |
//! | `windows_abi`   | +20 for the preferred toolchain ABI (Windows only)                 |
//! | `foreign_os`    | -50 when another OS keyword also appears                           |
//! | `source`        | -40 for source/vendor archives                                     |

use crate::error::ResolveError;
use crate::libs::utilities::compression::ArchiveFormat;
use crate::libs::utilities::platform::{self, ArchKeywords, OsKeywords, KNOWN_ARCHES, KNOWN_OSES};
use crate::schemas::config::{DetectionDefaults, Libc, WindowsAbi};
use crate::{log_debug, log_warn};
use std::collections::BTreeMap;

/// Result of applying one rule to one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Score(i32),
    Reject(String),
}

/// A named, independently testable scoring rule.
pub struct ScoringRule {
    pub name: &'static str,
    pub apply: fn(&Candidate<'_>, &DetectionContext<'_>) -> Verdict,
}

/// One asset filename under evaluation.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub lower: String,
}

impl<'a> Candidate<'a> {
    pub fn new(name: &'a str) -> Self {
        Candidate {
            name,
            lower: name.to_lowercase(),
        }
    }

    /// Lower-cased `-`/`_`/`.` separated words of the filename.
    fn words(&self) -> impl Iterator<Item = &str> {
        self.lower.split(['-', '_', '.']).filter(|w| !w.is_empty())
    }

    /// The lower-cased last dot segment, if it looks like a file extension:
    /// alphanumeric, at most 8 characters and not purely digits (`tool-1.2` has none).
    fn extension(&self) -> Option<&str> {
        let (_, ext) = self.lower.rsplit_once('.')?;
        let looks_like_ext = !ext.is_empty()
            && ext.len() <= 8
            && ext.chars().all(|c| c.is_ascii_alphanumeric())
            && !ext.chars().all(|c| c.is_ascii_digit());
        looks_like_ext.then_some(ext)
    }
}

/// Everything the rules need to know about the target and the release as a whole.
pub struct DetectionContext<'a> {
    pub platform: String,
    pub arch: String,
    pub defaults: &'a DetectionDefaults,
    os: Option<&'static OsKeywords>,
    arch_keywords: Option<&'static ArchKeywords>,
    /// Extra lower-cased spellings of the platform from the tool's `platform_map`.
    platform_aliases: Vec<String>,
    /// Extra lower-cased spellings of the arch from the tool's `arch_map`.
    arch_aliases: Vec<String>,
    /// False when no asset in the release names any OS at all.
    release_has_platforms: bool,
    /// Number of (non-metadata) assets that name some architecture.
    arch_tagged_assets: usize,
}

impl<'a> DetectionContext<'a> {
    /// Builds the context for one target over the whole asset list.
    pub fn new(
        asset_names: &[&str],
        platform: &str,
        arch: &str,
        platform_map: &BTreeMap<String, String>,
        arch_map: &BTreeMap<String, String>,
        defaults: &'a DetectionDefaults,
    ) -> Self {
        let os = platform::os_keywords(platform);
        let arch_keywords = platform::arch_keywords(arch);

        let mut platform_aliases: Vec<String> =
            platform_map.get(platform).map(|p| p.to_lowercase()).into_iter().collect();
        if os.is_none() {
            platform_aliases.push(platform.to_lowercase());
        }
        let mut arch_aliases: Vec<String> =
            arch_map.get(arch).map(|a| a.to_lowercase()).into_iter().collect();
        if arch_keywords.is_none() {
            arch_aliases.push(arch.to_lowercase());
        }

        let mut ctx = DetectionContext {
            platform: platform::normalize_os(platform),
            arch: platform::normalize_arch(arch),
            defaults,
            os,
            arch_keywords,
            platform_aliases,
            arch_aliases,
            release_has_platforms: false,
            arch_tagged_assets: 0,
        };

        let candidates: Vec<Candidate<'_>> = asset_names
            .iter()
            .map(|n| Candidate::new(n))
            .filter(|c| is_metadata(c).is_none())
            .collect();
        ctx.release_has_platforms = candidates
            .iter()
            .any(|c| ctx.names_target_platform(c) || KNOWN_OSES.iter().any(|o| o.matches(c.name)));
        ctx.arch_tagged_assets = candidates
            .iter()
            .filter(|c| ctx.names_target_arch(c) || foreign_arch(c, &ctx).is_some())
            .count();
        ctx
    }

    fn names_target_platform(&self, c: &Candidate<'_>) -> bool {
        self.os.is_some_and(|o| o.matches(c.name))
            || self.platform_aliases.iter().any(|a| c.lower.contains(a.as_str()))
    }

    fn names_target_arch(&self, c: &Candidate<'_>) -> bool {
        self.arch_keywords.is_some_and(|a| a.matches(c.name))
            || self.arch_aliases.iter().any(|a| c.lower.contains(a.as_str()))
    }
}

/// Another known arch named by the asset, when it does not name the target arch.
fn foreign_arch(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Option<&'static str> {
    KNOWN_ARCHES
        .iter()
        .filter(|a| a.name != ctx.arch)
        .find(|a| a.matches(c.name))
        .map(|a| a.name)
}

const METADATA_EXTENSIONS: &[&str] = &[
    "sha256", "sha256sum", "sha512", "sha512sum", "sha1", "md5", "asc", "sig", "pem", "sbom",
    "txt", "json", "intoto", "jsonl",
];

fn is_metadata(c: &Candidate<'_>) -> Option<String> {
    if let Some(ext) = c.extension() {
        if METADATA_EXTENSIONS.contains(&ext) {
            return Some(format!("checksum/signature file (.{ext})"));
        }
    }
    if c.lower.contains("checksums") || c.lower.contains("sha256sums") {
        return Some("checksum list".to_string());
    }
    None
}

fn rule_metadata(c: &Candidate<'_>, _: &DetectionContext<'_>) -> Verdict {
    match is_metadata(c) {
        Some(reason) => Verdict::Reject(reason),
        None => Verdict::Score(0),
    }
}

fn rule_platform(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Verdict {
    if ctx.names_target_platform(c) {
        Verdict::Score(100)
    } else if !ctx.release_has_platforms {
        Verdict::Score(0)
    } else {
        Verdict::Reject(format!("does not name platform '{}'", ctx.platform))
    }
}

fn rule_arch(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Verdict {
    if ctx.names_target_arch(c) {
        return Verdict::Score(100);
    }
    if let Some(other) = foreign_arch(c, ctx) {
        return Verdict::Reject(format!("built for arch '{other}', not '{}'", ctx.arch));
    }
    if ctx.platform == "macos" && c.lower.contains("universal") {
        return Verdict::Score(50);
    }
    if ctx.arch_tagged_assets > 1 {
        Verdict::Reject(format!(
            "does not name arch '{}' while {} assets are arch-specific",
            ctx.arch, ctx.arch_tagged_assets
        ))
    } else {
        Verdict::Score(0)
    }
}

const PACKAGE_EXTENSIONS: &[&str] = &["deb", "rpm", "apk", "pkg", "dmg", "msi", "snap", "flatpak"];

fn rule_format(c: &Candidate<'_>, _: &DetectionContext<'_>) -> Verdict {
    let weight = match ArchiveFormat::from_filename(c.name) {
        ArchiveFormat::Zip
        | ArchiveFormat::TarGz
        | ArchiveFormat::TarBz2
        | ArchiveFormat::TarXz
        | ArchiveFormat::Tar => 30,
        ArchiveFormat::Gz | ArchiveFormat::Bz2 | ArchiveFormat::Xz => 20,
        ArchiveFormat::Raw => match c.extension() {
            None | Some("exe") | Some("appimage") => 0,
            Some(ext) if PACKAGE_EXTENSIONS.contains(&ext) => -20,
            Some(_) => 10,
        },
    };
    Verdict::Score(weight)
}

fn rule_appimage(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Verdict {
    let wanted = ctx.defaults.prefer_appimage && ctx.platform == "linux";
    if wanted && c.extension() == Some("appimage") {
        Verdict::Score(60)
    } else {
        Verdict::Score(0)
    }
}

fn rule_libc(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Verdict {
    if ctx.platform != "linux" {
        return Verdict::Score(0);
    }
    let is_musl = c.lower.contains("musl");
    let is_gnu = c.lower.contains("gnu") || c.lower.contains("glibc");
    let preferred = match ctx.defaults.libc {
        Libc::Musl => is_musl,
        Libc::Glibc => is_gnu && !is_musl,
    };
    Verdict::Score(if preferred { 20 } else { 0 })
}

fn rule_windows_abi(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Verdict {
    if ctx.platform != "windows" {
        return Verdict::Score(0);
    }
    let preferred = match ctx.defaults.windows_abi {
        WindowsAbi::Msvc => c.lower.contains("msvc"),
        WindowsAbi::Gnu => c.lower.contains("gnu") || c.lower.contains("mingw"),
    };
    Verdict::Score(if preferred { 20 } else { 0 })
}

fn rule_foreign_os(c: &Candidate<'_>, ctx: &DetectionContext<'_>) -> Verdict {
    let foreign = KNOWN_OSES
        .iter()
        .filter(|o| o.name != ctx.platform)
        .any(|o| o.matches(c.name));
    Verdict::Score(if foreign { -50 } else { 0 })
}

fn rule_source(c: &Candidate<'_>, _: &DetectionContext<'_>) -> Verdict {
    let is_source = c
        .words()
        .any(|w| matches!(w, "source" | "src" | "sources" | "vendor" | "vendored"));
    Verdict::Score(if is_source { -40 } else { 0 })
}

/// The rules in evaluation order. Hard filters come first so that rejects short-circuit early.
pub static RULES: &[ScoringRule] = &[
    ScoringRule { name: "metadata", apply: rule_metadata },
    ScoringRule { name: "platform", apply: rule_platform },
    ScoringRule { name: "arch", apply: rule_arch },
    ScoringRule { name: "format", apply: rule_format },
    ScoringRule { name: "appimage", apply: rule_appimage },
    ScoringRule { name: "libc", apply: rule_libc },
    ScoringRule { name: "windows_abi", apply: rule_windows_abi },
    ScoringRule { name: "foreign_os", apply: rule_foreign_os },
    ScoringRule { name: "source", apply: rule_source },
];

/// Outcome of scoring one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetScore {
    Accepted {
        total: i32,
        /// Non-zero contributions, `(rule, weight)`.
        breakdown: Vec<(&'static str, i32)>,
    },
    Rejected {
        rule: &'static str,
        reason: String,
    },
}

/// Scores one asset against every rule.
pub fn score_asset(name: &str, ctx: &DetectionContext<'_>) -> AssetScore {
    let candidate = Candidate::new(name);
    let mut total = 0;
    let mut breakdown = Vec::new();
    for rule in RULES {
        match (rule.apply)(&candidate, ctx) {
            Verdict::Reject(reason) => return AssetScore::Rejected { rule: rule.name, reason },
            Verdict::Score(0) => {}
            Verdict::Score(w) => {
                total += w;
                breakdown.push((rule.name, w));
            }
        }
    }
    AssetScore::Accepted { total, breakdown }
}

/// Scores of every asset in release order, plus the winner.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub scores: Vec<(String, AssetScore)>,
    /// Index into `scores` of the chosen asset.
    pub chosen: Option<usize>,
}

impl DetectionReport {
    pub fn chosen_name(&self) -> Option<&str> {
        self.chosen.map(|i| self.scores[i].0.as_str())
    }

    /// One line per rejected asset, for diagnostics.
    pub fn rejection_reasons(&self) -> Vec<String> {
        self.scores
            .iter()
            .filter_map(|(name, score)| match score {
                AssetScore::Rejected { rule, reason } => Some(format!("{name}: {reason} [{rule}]")),
                AssetScore::Accepted { .. } => None,
            })
            .collect()
    }
}

/// Scores every asset and picks the best one. Never fails; see [`detect_asset`].
pub fn rank_assets(asset_names: &[&str], ctx: &DetectionContext<'_>) -> DetectionReport {
    let scores: Vec<(String, AssetScore)> = asset_names
        .iter()
        .map(|name| (name.to_string(), score_asset(name, ctx)))
        .collect();

    let mut chosen: Option<(usize, i32)> = None;
    for (i, (_, score)) in scores.iter().enumerate() {
        if let AssetScore::Accepted { total, .. } = score {
            // Strictly greater: ties keep the earlier asset.
            if chosen.is_none_or(|(_, best)| *total > best) {
                chosen = Some((i, *total));
            }
        }
    }

    DetectionReport {
        scores,
        chosen: chosen.map(|(i, _)| i),
    }
}

/// Picks the asset for `platform`/`arch` from a release's asset names.
///
/// # Errors
/// `ResolveError::AssetNotFound` when every asset is rejected; the reason lists
/// each asset with the rule that rejected it.
pub fn detect_asset(
    asset_names: &[&str],
    platform: &str,
    arch: &str,
    platform_map: &BTreeMap<String, String>,
    arch_map: &BTreeMap<String, String>,
    defaults: &DetectionDefaults,
) -> Result<DetectionReport, ResolveError> {
    let ctx = DetectionContext::new(asset_names, platform, arch, platform_map, arch_map, defaults);
    let report = rank_assets(asset_names, &ctx);

    for (name, score) in &report.scores {
        match score {
            AssetScore::Accepted { total, breakdown } => {
                log_debug!("[Detect] {} scored {} {:?}", name, total, breakdown)
            }
            AssetScore::Rejected { rule, reason } => {
                log_debug!("[Detect] {} rejected by '{}': {}", name, rule, reason)
            }
        }
    }

    if report.chosen.is_none() {
        let reasons = report.rejection_reasons();
        log_warn!(
            "[Detect] No asset survived for {}/{} among {} candidates",
            platform,
            arch,
            asset_names.len()
        );
        let detail = if reasons.is_empty() {
            "release has no assets".to_string()
        } else {
            reasons.join("; ")
        };
        return Err(ResolveError::AssetNotFound(format!(
            "auto-detection found nothing for {platform}/{arch}: {detail}"
        )));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(assets: &[&str], platform: &str, arch: &str, defaults: &DetectionDefaults) -> Result<String, ResolveError> {
        let none = BTreeMap::new();
        detect_asset(assets, platform, arch, &none, &none, defaults).map(|r| r.chosen_name().unwrap_or_default().to_string())
    }

    fn defaults() -> DetectionDefaults {
        DetectionDefaults::default()
    }

    const RIPGREP: &[&str] = &[
        "ripgrep-14.1.0-aarch64-apple-darwin.tar.gz",
        "ripgrep-14.1.0-aarch64-apple-darwin.tar.gz.sha256",
        "ripgrep-14.1.0-aarch64-unknown-linux-gnu.tar.gz",
        "ripgrep-14.1.0-x86_64-apple-darwin.tar.gz",
        "ripgrep-14.1.0-x86_64-pc-windows-gnu.zip",
        "ripgrep-14.1.0-x86_64-pc-windows-msvc.zip",
        "ripgrep-14.1.0-x86_64-unknown-linux-gnu.tar.gz",
        "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz",
        "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz.sha256",
        "ripgrep_14.1.0-1_amd64.deb",
        "ripgrep-14.1.0.tar.gz",
    ];

    #[test]
    fn picks_the_expected_ripgrep_asset_per_target() {
        let d = defaults();
        assert_eq!(pick(RIPGREP, "linux", "amd64", &d).unwrap(), "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz");
        assert_eq!(pick(RIPGREP, "linux", "arm64", &d).unwrap(), "ripgrep-14.1.0-aarch64-unknown-linux-gnu.tar.gz");
        assert_eq!(pick(RIPGREP, "macos", "arm64", &d).unwrap(), "ripgrep-14.1.0-aarch64-apple-darwin.tar.gz");
        assert_eq!(pick(RIPGREP, "windows", "amd64", &d).unwrap(), "ripgrep-14.1.0-x86_64-pc-windows-msvc.zip");
    }

    #[test]
    fn libc_preference_flips_the_selection() {
        let assets = ["tool-x86_64-unknown-linux-gnu.tar.gz", "tool-x86_64-unknown-linux-musl.tar.gz"];
        let musl = DetectionDefaults { libc: Libc::Musl, ..defaults() };
        let glibc = DetectionDefaults { libc: Libc::Glibc, ..defaults() };
        assert_eq!(pick(&assets, "linux", "amd64", &musl).unwrap(), "tool-x86_64-unknown-linux-musl.tar.gz");
        assert_eq!(pick(&assets, "linux", "amd64", &glibc).unwrap(), "tool-x86_64-unknown-linux-gnu.tar.gz");

        // Order in the release does not matter.
        let reversed = [assets[1], assets[0]];
        assert_eq!(pick(&reversed, "linux", "amd64", &musl).unwrap(), "tool-x86_64-unknown-linux-musl.tar.gz");
        assert_eq!(pick(&reversed, "linux", "amd64", &glibc).unwrap(), "tool-x86_64-unknown-linux-gnu.tar.gz");
    }

    #[test]
    fn windows_abi_preference_is_configurable() {
        let assets = ["t-x86_64-pc-windows-gnu.zip", "t-x86_64-pc-windows-msvc.zip"];
        assert_eq!(pick(&assets, "windows", "amd64", &defaults()).unwrap(), "t-x86_64-pc-windows-msvc.zip");
        let gnu = DetectionDefaults { windows_abi: WindowsAbi::Gnu, ..defaults() };
        assert_eq!(pick(&assets, "windows", "amd64", &gnu).unwrap(), "t-x86_64-pc-windows-gnu.zip");
    }

    #[test]
    fn asset_without_arch_is_rejected_when_several_arches_exist() {
        let assets = ["tool-linux.tar.gz", "tool-linux-amd64.tar.gz", "tool-linux-arm64.tar.gz"];
        let none = BTreeMap::new();
        let d = defaults();
        let ctx = DetectionContext::new(&assets, "linux", "riscv64", &none, &none, &d);
        assert!(matches!(score_asset("tool-linux.tar.gz", &ctx), AssetScore::Rejected { rule: "arch", .. }));

        let err = pick(&assets, "linux", "riscv64", &d).unwrap_err();
        assert_eq!(err.kind(), "AssetNotFound");
        assert!(err.reason().contains("tool-linux.tar.gz"));
    }

    #[test]
    fn arch_independent_asset_is_accepted_when_alone() {
        let assets = ["tool-linux.tar.gz", "tool-darwin.tar.gz"];
        assert_eq!(pick(&assets, "linux", "arm64", &defaults()).unwrap(), "tool-linux.tar.gz");
        let universal = ["tool-macos-universal.tar.gz", "tool-linux-amd64.tar.gz", "tool-linux-arm64.tar.gz"];
        assert_eq!(pick(&universal, "macos", "arm64", &defaults()).unwrap(), "tool-macos-universal.tar.gz");
    }

    #[test]
    fn platform_keyword_is_required_unless_release_is_platform_neutral() {
        let assets = ["tool-darwin-amd64.tar.gz", "tool-windows-amd64.zip"];
        assert_eq!(pick(&assets, "linux", "amd64", &defaults()).unwrap_err().kind(), "AssetNotFound");

        let neutral = ["tool-amd64.tar.gz", "tool-arm64.tar.gz"];
        assert_eq!(pick(&neutral, "linux", "arm64", &defaults()).unwrap(), "tool-arm64.tar.gz");
    }

    #[test]
    fn appimage_outranks_archives_only_when_preferred() {
        let assets = ["nvim-linux-x86_64.tar.gz", "nvim-linux-x86_64.appimage"];
        assert_eq!(pick(&assets, "linux", "amd64", &defaults()).unwrap(), "nvim-linux-x86_64.appimage");
        let off = DetectionDefaults { prefer_appimage: false, ..defaults() };
        assert_eq!(pick(&assets, "linux", "amd64", &off).unwrap(), "nvim-linux-x86_64.tar.gz");
    }

    #[test]
    fn raw_binary_is_accepted_when_nothing_else_fits() {
        let assets = ["jq-linux-amd64", "jq-linux-arm64", "jq-macos-arm64", "sha256sum.txt"];
        assert_eq!(pick(&assets, "linux", "amd64", &defaults()).unwrap(), "jq-linux-amd64");

        let mixed = ["tool-linux-amd64", "tool-linux-amd64.tar.gz"];
        assert_eq!(pick(&mixed, "linux", "amd64", &defaults()).unwrap(), "tool-linux-amd64.tar.gz");
    }

    #[test]
    fn maps_provide_extra_aliases() {
        let assets = ["tool-Darwin-x86_64.tar.gz", "tool-Linux-x86_64.tar.gz"];
        let mut pmap = BTreeMap::new();
        pmap.insert("linux".to_string(), "Linux".to_string());
        let none = BTreeMap::new();
        let report = detect_asset(&assets, "linux", "amd64", &pmap, &none, &defaults()).unwrap();
        assert_eq!(report.chosen_name(), Some("tool-Linux-x86_64.tar.gz"));
    }

    #[test]
    fn ties_go_to_the_first_asset() {
        let assets = ["b-linux-amd64.tar.gz", "a-linux-amd64.tar.gz"];
        assert_eq!(pick(&assets, "linux", "amd64", &defaults()).unwrap(), "b-linux-amd64.tar.gz");
    }

    #[test]
    fn individual_rules_are_testable() {
        let d = defaults();
        let none = BTreeMap::new();
        let ctx = DetectionContext::new(&["x-linux-amd64.tar.gz"], "linux", "amd64", &none, &none, &d);
        assert!(matches!(rule_metadata(&Candidate::new("x.tar.gz.sig"), &ctx), Verdict::Reject(_)));
        assert_eq!(rule_format(&Candidate::new("x.deb"), &ctx), Verdict::Score(-20));
        assert_eq!(rule_format(&Candidate::new("x.tar.xz"), &ctx), Verdict::Score(30));
        assert_eq!(rule_format(&Candidate::new("x-1.2"), &ctx), Verdict::Score(0));
        assert_eq!(rule_source(&Candidate::new("x-src.tar.gz"), &ctx), Verdict::Score(-40));
        assert_eq!(rule_foreign_os(&Candidate::new("x-linux-darwin.tar.gz"), &ctx), Verdict::Score(-50));
        assert!(matches!(rule_arch(&Candidate::new("x-linux-arm64.tar.gz"), &ctx), Verdict::Reject(_)));
    }
}
