//! Core types for hubfetch

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Split a repository URL into its last two `/`-separated segments
///
/// Segments are returned verbatim; no URL parsing or trimming happens here.
/// Returns `None` when the input has fewer than two segments.
///
/// ```
/// use hubfetch::types::split_reference;
///
/// assert_eq!(
///     split_reference("https://github.com/rust-lang/cargo"),
///     Some(("rust-lang", "cargo"))
/// );
/// assert_eq!(split_reference("cargo"), None);
/// ```
pub fn split_reference(url: &str) -> Option<(&str, &str)> {
    let mut segments = url.rsplit('/');
    let repo = segments.next()?;
    let owner = segments.next()?;
    Some((owner, repo))
}

/// Owner/name pair identifying a GitHub repository
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Account or organization login
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Build a reference from a free-form repository URL
    pub fn from_url(url: &str) -> Result<Self> {
        match split_reference(url) {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(Error::InvalidReference(url.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Repository owner as returned by the GitHub API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    /// Owner login
    pub login: String,
}

/// Snapshot of `GET /repos/{owner}/{repo}`
///
/// Fields the crate reads are typed; the rest of the body is kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Repository name
    pub name: String,
    /// Owning account
    pub owner: RepoOwner,
    /// Star count
    #[serde(default)]
    pub stargazers_count: u64,
    /// Canonical web URL, sent to the export backend
    pub html_url: String,
    /// Repository description
    #[serde(default)]
    pub description: Option<String>,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RepositoryMetadata {
    /// Filename used when saving an exported repository
    pub fn export_file_name(&self) -> String {
        format!("{}_content.txt", self.name)
    }
}

/// Entry of `GET /repos/{owner}/{repo}/contents`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// File or directory name
    pub name: String,
    /// Path inside the repository
    #[serde(default)]
    pub path: String,
    /// "file", "dir", "symlink" or "submodule"
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw download URL, absent for directories
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    /// Whether this entry is a regular file
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Reduced view of a channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel title
    pub title: String,
    /// Subscriber count as reported by the API (a decimal string)
    pub subscriber_count: Option<String>,
}

/// Reduced view of a search result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    /// Video ID
    pub id: String,
    /// Video title
    pub title: String,
}

/// Opaque OAuth bearer token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Request body for POST /download-repo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRepoRequest {
    /// Repository URL handed to the converter
    pub repo_url: String,
}
