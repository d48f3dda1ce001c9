// Data shapes for GitHub releases as the resolution engine consumes them.
use serde::{Deserialize, Serialize};

/// Represents a downloadable asset attached to a GitHub release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// The filename of the asset as it appears on GitHub.
    ///
    /// # Example
    /// ```text
    /// "bat-v0.24.0-x86_64-unknown-linux-musl.tar.gz"
    /// ```
    pub name: String,

    /// The direct URL for downloading the asset file.
    pub browser_download_url: String,
}

/// A GitHub release: its tag plus the ordered list of assets.
///
/// Asset order is the order the API returned them in; the engine uses it to
/// break ties, so it must not be re-sorted after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Builds a release from a tag and `(name, url)` pairs.
    pub fn new<I, N, U>(tag_name: impl Into<String>, assets: I) -> Self
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        Release {
            tag_name: tag_name.into(),
            assets: assets
                .into_iter()
                .map(|(name, url)| ReleaseAsset {
                    name: name.into(),
                    browser_download_url: url.into(),
                })
                .collect(),
        }
    }

    /// The version used for `{version}` substitution: the tag with one leading `v` stripped.
    pub fn version(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }

    /// Asset filenames in release order.
    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.name.as_str()).collect()
    }
}
