//! Converter that runs inside the server process

use super::traits::Converter;
use crate::converter;
use crate::github::GitHubClient;
use async_trait::async_trait;
use std::path::Path;

/// Performs the repository conversion directly through [`GitHubClient`]
///
/// Useful where spawning processes is not allowed. Produces the same
/// artifact as `hubfetch convert`.
#[derive(Debug, Clone)]
pub struct InProcessConverter {
    client: GitHubClient,
}

impl InProcessConverter {
    /// Create a converter using `client` for all GitHub calls
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Converter for InProcessConverter {
    async fn convert(&self, repo_url: &str, work_dir: &Path) -> crate::Result<String> {
        converter::export_repository(&self.client, repo_url, work_dir).await
    }

    fn name(&self) -> &'static str {
        "in-process"
    }
}
