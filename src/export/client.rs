//! Client for the export backend

use crate::error::{ApiError, Error, Result};
use crate::types::DownloadRepoRequest;

/// Calls `POST /download-repo` on a running backend
#[derive(Clone, Debug)]
pub struct ExportClient {
    http: reqwest::Client,
    backend_url: String,
}

impl ExportClient {
    /// Create a client for the backend at `backend_url`
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the backend to export `repo_url` and return the file body
    pub async fn download(&self, repo_url: &str) -> Result<Vec<u8>> {
        let url = format!("{}/download-repo", self.backend_url);
        let response = self
            .http
            .post(&url)
            .json(&DownloadRepoRequest {
                repo_url: repo_url.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let payload = serde_json::from_str::<ApiError>(&body)
                .unwrap_or_else(|_| ApiError::new(status.to_string(), body));
            return Err(Error::ExportFailed {
                status: status.as_u16(),
                error: payload.error,
                details: payload.details,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
