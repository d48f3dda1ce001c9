//! Error types of the resolution engine.
//!
//! Every failure of a (tool, platform, arch) unit is one of the [`ResolveError`]
//! variants. None of them is fatal for the run: the orchestrator records the error
//! against the unit and keeps going with the others. Each variant carries the
//! reason string shown in the summary, so that every disqualification can be
//! traced back to something concrete.

use thiserror::Error;

/// Failure of a single resolution unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Malformed tool configuration. Fatal for that tool only.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No release asset matched the pattern, or none survived auto-detection.
    #[error("no compatible asset: {0}")]
    AssetNotFound(String),

    /// Network failure after retries were exhausted (or a non-retryable status).
    #[error("download failed: {0}")]
    Download(String),

    /// Corrupt archive, unsupported layout, or a write failure while installing.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The archive was read but the expected entry is absent.
    #[error("binary not found: {0}")]
    BinaryNotFound(String),
}

impl ResolveError {
    /// Short, stable name of the error kind, used in summary tables.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Configuration(_) => "ConfigurationError",
            ResolveError::AssetNotFound(_) => "AssetNotFound",
            ResolveError::Download(_) => "DownloadError",
            ResolveError::Extraction(_) => "ExtractionError",
            ResolveError::BinaryNotFound(_) => "BinaryNotFound",
        }
    }

    /// The reason string without the kind prefix.
    pub fn reason(&self) -> &str {
        match self {
            ResolveError::Configuration(r)
            | ResolveError::AssetNotFound(r)
            | ResolveError::Download(r)
            | ResolveError::Extraction(r)
            | ResolveError::BinaryNotFound(r) => r,
        }
    }
}

/// Failure while expanding a pattern template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `{name}` placeholder that is not one of `version`, `platform`, `arch`.
    #[error("unknown placeholder `{{{0}}}` in pattern `{1}`")]
    UnknownToken(String, String),

    /// The expanded pattern could not be compiled for matching.
    #[error("cannot match with pattern `{0}`: {1}")]
    Glob(String, String),
}

impl From<PatternError> for ResolveError {
    fn from(err: PatternError) -> Self {
        ResolveError::Configuration(err.to_string())
    }
}

/// Failure loading the configuration file itself. Unlike [`ResolveError`], this
/// aborts the run: without a configuration there is nothing to resolve.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
