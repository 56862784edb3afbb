//! Converter abstraction for the export pipeline

use async_trait::async_trait;
use std::path::Path;

/// Produces an export artifact for a repository URL
///
/// Implementations write the artifact into `work_dir` and report its filename
/// relative to that directory. The pipeline trims and validates the reported
/// name before reading the file.
///
/// # Examples
///
/// ```no_run
/// use hubfetch::export::{CliConverter, Converter};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let converter = CliConverter::new(PathBuf::from("/usr/local/bin/github2file"));
/// let name = converter
///     .convert("https://github.com/serde-rs/json", Path::new("/tmp/export"))
///     .await?;
/// println!("artifact: {}", name.trim());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert the repository, returning the artifact filename as reported
    async fn convert(&self, repo_url: &str, work_dir: &Path) -> crate::Result<String>;

    /// Get the name of this implementation
    fn name(&self) -> &'static str;
}
