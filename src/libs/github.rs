//! # GitHub Collaborator
//!
//! Release metadata and asset bytes come in through two small traits,
//! [`ReleaseSource`] and [`AssetDownloader`]. The orchestrator only sees the
//! traits; [`GitHubClient`] implements both on top of a shared `ureq::Agent`.
//!
//! Every request has a timeout. Transport errors, HTTP 429 and HTTP 5xx are
//! retried a bounded number of times with exponential backoff; 404 and the
//! other 4xx statuses fail immediately.

use crate::error::ResolveError;
use crate::schemas::release::Release;
use crate::{log_debug, log_warn};
use std::io::Read;
use std::thread;
use std::time::Duration;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "dotbins";

/// Provides the release a tool should be installed from.
pub trait ReleaseSource: Sync {
    /// Fetches `repo`'s release `tag`, or the latest release when `tag` is `None`.
    fn fetch_release(&self, repo: &str, tag: Option<&str>) -> Result<Release, ResolveError>;
}

/// Fetches the bytes behind an asset URL.
pub trait AssetDownloader: Sync {
    fn download(&self, url: &str) -> Result<Vec<u8>, ResolveError>;
}

/// How often and how patiently to retry transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            initial_backoff: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Whether a failed attempt is worth repeating.
#[derive(Debug)]
enum Attempt {
    Transient(String),
    Final(ResolveError),
}

/// HTTP statuses that indicate a transient server-side problem.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

fn classify(err: ureq::Error, what: &str) -> Attempt {
    match err {
        ureq::Error::Status(404, _) => Attempt::Final(ResolveError::Download(format!("{what}: HTTP 404 not found"))),
        ureq::Error::Status(code, _) if is_retryable_status(code) => Attempt::Transient(format!("{what}: HTTP {code}")),
        ureq::Error::Status(code, resp) => Attempt::Final(ResolveError::Download(format!(
            "{what}: HTTP {code} {}",
            resp.status_text()
        ))),
        ureq::Error::Transport(t) => Attempt::Transient(format!("{what}: {t}")),
    }
}

/// Blocking GitHub client shared by every worker thread.
pub struct GitHubClient {
    agent: ureq::Agent,
    token: Option<String>,
    policy: RetryPolicy,
}

impl GitHubClient {
    /// Builds a client; `GITHUB_TOKEN` from the environment authenticates API calls.
    pub fn new(policy: RetryPolicy) -> Self {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());
        if token.is_some() {
            log_debug!("[GitHub] Using GITHUB_TOKEN for API requests");
        }
        GitHubClient {
            agent: ureq::AgentBuilder::new()
                .timeout(policy.timeout)
                .user_agent(USER_AGENT)
                .build(),
            token,
            policy,
        }
    }

    /// Uses `token` instead of `GITHUB_TOKEN` when one is given (`--github-token`).
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            log_debug!("[GitHub] Using the token from the command line for API requests");
            self.token = Some(token);
        }
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Runs `op` until it succeeds, fails for good, or attempts run out.
    fn with_retry<T>(&self, mut op: impl FnMut() -> Result<T, Attempt>) -> Result<T, ResolveError> {
        let attempts = self.policy.attempts.max(1);
        let mut backoff = self.policy.initial_backoff;
        let mut last = String::new();
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(Attempt::Final(err)) => return Err(err),
                Err(Attempt::Transient(reason)) => {
                    last = reason;
                    if attempt < attempts {
                        log_warn!(
                            "[GitHub] {} (attempt {}/{}), retrying in {:?}",
                            last,
                            attempt,
                            attempts,
                            backoff
                        );
                        thread::sleep(backoff);
                        backoff *= 2;
                    }
                }
            }
        }
        Err(ResolveError::Download(format!("{last} (gave up after {attempts} attempts)")))
    }

    fn api_get(&self, url: &str) -> ureq::Request {
        let request = self.agent.get(url).set("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        GitHubClient::new(RetryPolicy::default())
    }
}

/// API URL of a release: `releases/latest` or `releases/tags/<tag>`.
pub fn release_url(repo: &str, tag: Option<&str>) -> String {
    match tag {
        Some(tag) => format!("{API_BASE}/repos/{repo}/releases/tags/{tag}"),
        None => format!("{API_BASE}/repos/{repo}/releases/latest"),
    }
}

impl ReleaseSource for GitHubClient {
    fn fetch_release(&self, repo: &str, tag: Option<&str>) -> Result<Release, ResolveError> {
        let url = release_url(repo, tag);
        log_debug!("[GitHub] Fetching release metadata from {}", url);
        let release = self
            .with_retry(|| {
                let response = self.api_get(&url).call().map_err(|e| classify(e, repo))?;
                response
                    .into_json::<Release>()
                    .map_err(|e| Attempt::Transient(format!("{repo}: unreadable release JSON: {e}")))
            })
            .map_err(|err| match err {
                ResolveError::Download(reason) if reason.contains("HTTP 404") => ResolveError::Download(match tag {
                    Some(tag) => format!("{repo}: no release tagged '{tag}'"),
                    None => format!("{repo}: no releases found"),
                }),
                other => other,
            })?;
        log_debug!(
            "[GitHub] {} release {} has {} assets",
            repo,
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }
}

impl AssetDownloader for GitHubClient {
    fn download(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        log_debug!("[GitHub] Downloading {}", url);
        self.with_retry(|| {
            let response = self
                .agent
                .get(url)
                .set("Accept", "application/octet-stream")
                .call()
                .map_err(|e| classify(e, url))?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .map_err(|e| Attempt::Transient(format!("{url}: {e}")))?;
            Ok(bytes)
        })
    }
}
