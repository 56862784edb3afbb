//! Repository panel: metadata lookup and content download

use super::Ticket;
use crate::config::GitHubConfig;
use crate::error::{Error, Result};
use crate::export::ExportClient;
use crate::github::GitHubClient;
use crate::types::{RepoRef, RepositoryMetadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-only view of a [`RepoSession`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoSnapshot {
    /// Metadata from the latest successful lookup
    pub metadata: Option<RepositoryMetadata>,
    /// A request is in flight
    pub is_loading: bool,
    /// Message for the latest failure
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct RepoState {
    metadata: Option<RepositoryMetadata>,
    is_loading: bool,
    error: Option<String>,
    seq: Ticket,
}

struct RepoInner {
    github: GitHubClient,
    exporter: ExportClient,
    state: RwLock<RepoState>,
}

/// Session for the repository panel
#[derive(Clone)]
pub struct RepoSession {
    inner: Arc<RepoInner>,
}

/// Text shown for a failure; remote failures drop the variant prefix
fn failure_text(error: &Error) -> String {
    match error {
        Error::Remote(failure) => failure.to_string(),
        other => other.to_string(),
    }
}

impl RepoSession {
    /// Create a session talking to GitHub and the export backend
    pub fn new(config: &GitHubConfig, exporter: ExportClient) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RepoInner {
                github: GitHubClient::new(config)?,
                exporter,
                state: RwLock::new(RepoState::default()),
            }),
        })
    }

    async fn begin(&self) -> Ticket {
        let mut state = self.inner.state.write().await;
        state.seq += 1;
        state.is_loading = true;
        state.error = None;
        state.seq
    }

    /// Finish request `ticket`; no-op if a newer request has started
    async fn finish(&self, ticket: Ticket, update: impl FnOnce(&mut RepoState)) {
        let mut state = self.inner.state.write().await;
        if state.seq != ticket {
            tracing::debug!(ticket, latest = state.seq, "discarding superseded result");
            return;
        }
        state.is_loading = false;
        update(&mut state);
    }

    /// Look up repository metadata for a free-form URL
    pub async fn fetch_repo(&self, repo_url: &str) -> Result<RepositoryMetadata> {
        let ticket = self.begin().await;

        let result = match RepoRef::from_url(repo_url) {
            Ok(repo) => self.inner.github.fetch_repository(&repo).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(metadata) => {
                tracing::info!(repo = %metadata.name, stars = metadata.stargazers_count, "repository loaded");
                let metadata = metadata.clone();
                self.finish(ticket, |s| s.metadata = Some(metadata)).await;
            }
            Err(e) => {
                tracing::warn!(repo_url, error = %e, "repository lookup failed");
                let message = format!("Error fetching GitHub data: {}", failure_text(e));
                self.finish(ticket, |s| s.error = Some(message)).await;
            }
        }
        result
    }

    /// Export the loaded repository through the backend into `dest_dir`
    ///
    /// The file is saved as `{name}_content.txt` and its path returned.
    pub async fn download_content(&self, dest_dir: &Path) -> Result<PathBuf> {
        let Some(metadata) = self.inner.state.read().await.metadata.clone() else {
            return Err(Error::NoRepository);
        };

        let ticket = self.begin().await;

        let result: Result<PathBuf> = async {
            let body = self.inner.exporter.download(&metadata.html_url).await?;
            tokio::fs::create_dir_all(dest_dir).await?;
            let target = dest_dir.join(metadata.export_file_name());
            tokio::fs::write(&target, &body).await?;
            Ok(target)
        }
        .await;

        match &result {
            Ok(path) => {
                tracing::info!(path = ?path, "repository content saved");
                self.finish(ticket, |_| {}).await;
            }
            Err(e) => {
                tracing::warn!(repo = %metadata.html_url, error = %e, "repository download failed");
                let message = format!("Error downloading repository content: {}", failure_text(e));
                self.finish(ticket, |s| s.error = Some(message)).await;
            }
        }
        result
    }

    /// Current state
    pub async fn snapshot(&self) -> RepoSnapshot {
        let state = self.inner.state.read().await;
        RepoSnapshot {
            metadata: state.metadata.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}
