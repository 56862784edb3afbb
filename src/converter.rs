//! Repository-to-text conversion
//!
//! Concatenates every top-level file of a repository into one text blob:
//!
//! ```text
//! File: README.md
//!
//! <contents>
//!
//! File: Cargo.toml
//! ...
//! ```
//!
//! This is what `hubfetch convert <url>` runs, which in turn is the default
//! external converter of the export backend.

use crate::error::Result;
use crate::github::GitHubClient;
use crate::types::RepoRef;
use std::fmt::Write;
use std::path::Path;

/// Artifact filename for a repository
pub fn output_file_name(repo: &RepoRef) -> String {
    format!("{}_content.txt", repo.repo)
}

/// Fetch and concatenate the repository's top-level files
pub async fn render_repository(client: &GitHubClient, repo: &RepoRef) -> Result<String> {
    let entries = client.list_contents(repo).await?;
    let mut content = String::new();

    for entry in entries.iter().filter(|e| e.is_file()) {
        let Some(url) = entry.download_url.as_deref() else {
            tracing::debug!(file = %entry.path, "skipping file without download url");
            continue;
        };
        let body = client.fetch_raw(url).await?;
        // Writing to a String cannot fail
        let _ = write!(content, "File: {}\n\n{}\n\n", entry.name, body);
    }

    tracing::info!(repo = %repo, bytes = content.len(), "repository rendered");
    Ok(content)
}

/// Render `repo_url` into `out_dir`, returning the artifact filename
pub async fn export_repository(
    client: &GitHubClient,
    repo_url: &str,
    out_dir: &Path,
) -> Result<String> {
    let repo = RepoRef::from_url(repo_url)?;
    let content = render_repository(client, &repo).await?;
    let name = output_file_name(&repo);
    tokio::fs::write(out_dir.join(&name), content).await?;
    Ok(name)
}
