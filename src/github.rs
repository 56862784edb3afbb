//! GitHub REST client (unauthenticated)

use crate::config::GitHubConfig;
use crate::error::{Error, RemoteFailure, Result};
use crate::types::{ContentEntry, RepoRef, RepositoryMetadata};
use serde::de::DeserializeOwned;

/// User agent sent with every request; GitHub rejects requests without one
const USER_AGENT: &str = concat!("hubfetch/", env!("CARGO_PKG_VERSION"));

/// Client for the repository endpoints of the GitHub API
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    /// Create a client from configuration
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch repository metadata (`GET /repos/{owner}/{repo}`)
    pub async fn fetch_repository(&self, repo: &RepoRef) -> Result<RepositoryMetadata> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_base,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo)
        );
        tracing::debug!(repo = %repo, "fetching repository metadata");
        self.get_json(&url).await
    }

    /// List the top-level contents of a repository (`GET /repos/{owner}/{repo}/contents`)
    pub async fn list_contents(&self, repo: &RepoRef) -> Result<Vec<ContentEntry>> {
        let url = format!(
            "{}/repos/{}/{}/contents",
            self.api_base,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo)
        );
        tracing::debug!(repo = %repo, "listing repository contents");
        self.get_json(&url).await
    }

    /// Download a raw file body as text
    pub async fn fetch_raw(&self, download_url: &str) -> Result<String> {
        let response = self
            .http
            .get(download_url)
            .send()
            .await
            .map_err(|e| Error::Remote(RemoteFailure::classify(&e)))?;
        let response = check_status(response).await?;
        response
            .text()
            .await
            .map_err(|e| Error::Remote(RemoteFailure::classify(&e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| Error::Remote(RemoteFailure::classify(&e)))?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Remote(RemoteFailure::classify(&e)))
    }
}

/// Turn a non-success response into `RemoteFailure::Status`
///
/// GitHub error bodies look like `{"message": "Not Found", ...}`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: Option<serde_json::Value> = response.json().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());
    Err(Error::Remote(RemoteFailure::Status {
        status: status.as_u16(),
        message,
    }))
}
