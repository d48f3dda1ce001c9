// Platform and architecture vocabulary: canonical names for the build matrix,
// detection of the machine we run on, and the keyword matchers the auto-detector
// uses to recognize a platform or architecture inside an asset filename.

use crate::log_warn;
use regex::Regex;
use std::sync::LazyLock;

/// Keyword matcher for one operating system.
pub struct OsKeywords {
    pub name: &'static str,
    regex: Regex,
    /// Names that look like this OS but are a different target (android for linux).
    anti: Option<Regex>,
}

impl OsKeywords {
    /// True if `filename` names this OS and is not excluded by the anti-pattern.
    pub fn matches(&self, filename: &str) -> bool {
        if let Some(anti) = &self.anti {
            if anti.is_match(filename) {
                return false;
            }
        }
        self.regex.is_match(filename)
    }
}

/// Keyword matcher for one CPU architecture.
pub struct ArchKeywords {
    pub name: &'static str,
    regex: Regex,
}

impl ArchKeywords {
    pub fn matches(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }
}

fn os(name: &'static str, pattern: &str, anti: Option<&str>) -> Option<OsKeywords> {
    let anti = match anti {
        Some(a) => Some(Regex::new(a).ok()?),
        None => None,
    };
    Some(OsKeywords {
        name,
        regex: Regex::new(pattern).ok()?,
        anti,
    })
}

fn arch(name: &'static str, pattern: &str) -> Option<ArchKeywords> {
    Some(ArchKeywords {
        name,
        regex: Regex::new(pattern).ok()?,
    })
}

/// Every operating system the detector knows, keyed by canonical name.
pub static KNOWN_OSES: LazyLock<Vec<OsKeywords>> = LazyLock::new(|| {
    [
        os("macos", r"(?i)(darwin|mac.?(os)?|osx|apple)", None),
        os("windows", r"(?i)(^win|[^r]win|windows)", None),
        os("linux", r"(?i)(linux|ubuntu)", Some(r"(?i)android")),
        os("freebsd", r"(?i)freebsd", None),
        os("netbsd", r"(?i)netbsd", None),
        os("openbsd", r"(?i)openbsd", None),
        os("android", r"(?i)android", None),
        os("illumos", r"(?i)illumos", None),
        os("solaris", r"(?i)solaris", None),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// Every architecture the detector knows, keyed by canonical name.
pub static KNOWN_ARCHES: LazyLock<Vec<ArchKeywords>> = LazyLock::new(|| {
    [
        arch("amd64", r"(?i)(x64|amd64|x86[-_]?64)"),
        arch("arm64", r"(?i)(arm64|armv8|aarch64)"),
        arch("386", r"(?i)(x32|amd32|x86[-_]?32|i?[3-6]86\b)"),
        arch("arm", r"(?i)(arm32|armv[5-7]|armhf|arm\b)"),
        arch("riscv64", r"(?i)riscv64"),
        arch("ppc64le", r"(?i)(ppc64le|powerpc64le)"),
        arch("s390x", r"(?i)s390x"),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// Looks up the keyword matcher of a platform name (accepts `darwin` for macos).
pub fn os_keywords(platform: &str) -> Option<&'static OsKeywords> {
    let canonical = normalize_os(platform);
    KNOWN_OSES.iter().find(|o| o.name == canonical)
}

/// Looks up the keyword matcher of an architecture name (accepts `x86_64`, `aarch64`).
pub fn arch_keywords(arch: &str) -> Option<&'static ArchKeywords> {
    let canonical = normalize_arch(arch);
    KNOWN_ARCHES.iter().find(|a| a.name == canonical)
}

/// Maps the many spellings of an OS onto the build-matrix vocabulary.
pub fn normalize_os(os: &str) -> String {
    match os.to_lowercase().as_str() {
        "macos" | "darwin" | "apple-darwin" | "osx" => "macos".to_string(),
        "linux" => "linux".to_string(),
        "windows" | "win32" | "win64" => "windows".to_string(),
        other => other.to_string(),
    }
}

/// Maps the many spellings of an architecture onto the build-matrix vocabulary.
pub fn normalize_arch(arch: &str) -> String {
    match arch.to_lowercase().as_str() {
        "aarch64" | "arm64" => "arm64".to_string(),
        "amd64" | "x86_64" | "x64" => "amd64".to_string(),
        "x86" | "i386" | "i686" | "386" => "386".to_string(),
        other => other.to_string(),
    }
}

/// The `(platform, arch)` pair of the running machine, in matrix vocabulary.
pub fn current_platform() -> (String, String) {
    let platform = normalize_os(std::env::consts::OS);
    let arch = normalize_arch(std::env::consts::ARCH);
    if os_keywords(&platform).is_none() {
        log_warn!("[Platform] Unknown OS '{}', asset auto-detection may not work", platform);
    }
    (platform, arch)
}

/// Suffix executables carry on `platform` (`.exe` on Windows, nothing elsewhere).
pub fn exe_suffix(platform: &str) -> &'static str {
    if normalize_os(platform) == "windows" {
        ".exe"
    } else {
        ""
    }
}

/// Destination filename for a logical binary on `platform`.
pub fn executable_file_name(binary_name: &str, platform: &str) -> String {
    let suffix = exe_suffix(platform);
    if suffix.is_empty() || binary_name.to_lowercase().ends_with(suffix) {
        binary_name.to_string()
    } else {
        format!("{binary_name}{suffix}")
    }
}
