//! Repository export pipeline
//!
//! URL → converter run in a fresh request directory → artifact filename from
//! the converter → file contents returned to the caller.
//!
//! Every request gets its own directory under the configured work dir, so two
//! exports that produce the same filename never overwrite each other.

use crate::config::{Config, ConverterMode, ExportConfig};
use crate::error::{ArtifactError, Error, Result};
use crate::github::GitHubClient;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

mod cli;
mod client;
mod in_process;
mod traits;

pub use cli::CliConverter;
pub use client::ExportClient;
pub use in_process::InProcessConverter;
pub use traits::Converter;

/// File produced by one export
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Filename reported by the converter, trimmed
    pub file_name: String,
    /// Where the file was read from
    pub path: PathBuf,
    /// File contents
    pub contents: Vec<u8>,
}

/// Runs conversions and collects their artifacts
pub struct RepoExporter {
    converter: Arc<dyn Converter>,
    work_dir: PathBuf,
    keep_artifacts: bool,
    permits: Arc<Semaphore>,
}

impl RepoExporter {
    /// Create an exporter around `converter`
    pub fn new(converter: Arc<dyn Converter>, config: &ExportConfig) -> Self {
        Self {
            converter,
            work_dir: config.work_dir.clone(),
            keep_artifacts: config.keep_artifacts,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        }
    }

    /// Build the exporter selected by `export.mode`
    pub fn from_config(config: &Config) -> Result<Self> {
        let converter: Arc<dyn Converter> = match config.export.mode {
            ConverterMode::External => {
                Arc::new(CliConverter::from_config(&config.export, &config.github)?)
            }
            ConverterMode::InProcess => {
                Arc::new(InProcessConverter::new(GitHubClient::new(&config.github)?))
            }
        };
        Ok(Self::new(converter, &config.export))
    }

    /// Name of the converter in use
    pub fn converter_name(&self) -> &'static str {
        self.converter.name()
    }

    /// Export `repo_url` and return the artifact
    pub async fn export(&self, repo_url: &str) -> Result<ExportArtifact> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Other("export pipeline is shut down".into()))?;

        let request_dir = self.work_dir.join(format!("export-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&request_dir).await?;

        tracing::info!(
            repo_url,
            dir = ?request_dir,
            converter = self.converter.name(),
            "starting export"
        );

        let result = self.run(repo_url, &request_dir).await;

        if !self.keep_artifacts
            && let Err(e) = tokio::fs::remove_dir_all(&request_dir).await
        {
            tracing::warn!(dir = ?request_dir, error = %e, "failed to remove export directory");
        }

        match &result {
            Ok(artifact) => tracing::info!(
                repo_url,
                file = %artifact.file_name,
                bytes = artifact.contents.len(),
                "export complete"
            ),
            Err(e) => tracing::warn!(repo_url, error = %e, "export failed"),
        }
        result
    }

    async fn run(&self, repo_url: &str, request_dir: &Path) -> Result<ExportArtifact> {
        let reported = self.converter.convert(repo_url, request_dir).await?;
        let (file_name, path) = resolve_artifact_path(request_dir, &reported)?;

        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| ArtifactError::Unreadable {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        Ok(ExportArtifact {
            file_name,
            path,
            contents,
        })
    }
}

/// Resolve a converter-reported filename against `dir`
///
/// The name is trimmed of surrounding whitespace. Absolute paths and `..`
/// components are rejected so the result always stays inside `dir`.
pub fn resolve_artifact_path(dir: &Path, reported: &str) -> Result<(String, PathBuf)> {
    let name = reported.trim();
    if name.is_empty() {
        return Err(ArtifactError::NoFileName.into());
    }

    let relative = Path::new(name);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !contained {
        return Err(ArtifactError::OutsideWorkDir {
            name: name.to_string(),
        }
        .into());
    }

    Ok((name.to_string(), dir.join(relative)))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Writes `contents` to `name` and reports `reported`
    struct FakeConverter {
        name: String,
        reported: String,
        contents: String,
    }

    #[async_trait]
    impl Converter for FakeConverter {
        async fn convert(&self, _repo_url: &str, work_dir: &Path) -> Result<String> {
            tokio::fs::write(work_dir.join(&self.name), &self.contents).await?;
            Ok(self.reported.clone())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct FailingConverter;

    #[async_trait]
    impl Converter for FailingConverter {
        async fn convert(&self, _repo_url: &str, _work_dir: &Path) -> Result<String> {
            Err(ConversionError::Failed {
                exit_code: Some(1),
                stderr: "repository not found\n".into(),
            }
            .into())
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    /// Tracks the highest number of overlapping conversions
    struct CountingConverter {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Converter for CountingConverter {
        async fn convert(&self, _repo_url: &str, work_dir: &Path) -> Result<String> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            tokio::fs::write(work_dir.join("out.txt"), "x").await?;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("out.txt".into())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn config_in(dir: &Path) -> ExportConfig {
        ExportConfig {
            work_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_trims_and_joins() {
        let (name, path) = resolve_artifact_path(Path::new("/srv/x"), "  out.txt\n").unwrap();
        assert_eq!(name, "out.txt");
        assert_eq!(path, PathBuf::from("/srv/x/out.txt"));

        let (_, nested) = resolve_artifact_path(Path::new("/srv/x"), "./a/b.txt").unwrap();
        assert_eq!(nested, PathBuf::from("/srv/x/./a/b.txt"));
    }

    #[test]
    fn resolve_rejects_escapes() {
        for bad in ["../secret", "/etc/passwd", "a/../../b"] {
            let err = resolve_artifact_path(Path::new("/srv/x"), bad).unwrap_err();
            assert!(
                matches!(err, Error::Artifact(ArtifactError::OutsideWorkDir { .. })),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            resolve_artifact_path(Path::new("/srv/x"), " \n").unwrap_err(),
            Error::Artifact(ArtifactError::NoFileName)
        ));
    }

    #[tokio::test]
    async fn export_returns_artifact_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = RepoExporter::new(
            Arc::new(FakeConverter {
                name: "out.txt".into(),
                reported: "out.txt\n".into(),
                contents: "File: a\n\nhello\n\n".into(),
            }),
            &config_in(dir.path()),
        );

        let artifact = exporter.export("https://github.com/a/b").await.unwrap();
        assert_eq!(artifact.file_name, "out.txt");
        assert_eq!(artifact.contents, b"File: a\n\nhello\n\n");
        assert!(!artifact.path.exists());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn keep_artifacts_leaves_request_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.keep_artifacts = true;
        let exporter = RepoExporter::new(
            Arc::new(FakeConverter {
                name: "out.txt".into(),
                reported: "out.txt".into(),
                contents: "kept".into(),
            }),
            &config,
        );

        let artifact = exporter.export("https://github.com/a/b").await.unwrap();
        assert!(artifact.path.exists());
        assert!(artifact.path.starts_with(dir.path()));
    }

    #[tokio::test]
    async fn missing_artifact_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = RepoExporter::new(
            Arc::new(FakeConverter {
                name: "written.txt".into(),
                reported: "other.txt".into(),
                contents: String::new(),
            }),
            &config_in(dir.path()),
        );

        let err = exporter.export("https://github.com/a/b").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Artifact(ArtifactError::Unreadable { .. })
        ));
    }

    #[tokio::test]
    async fn converter_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = RepoExporter::new(Arc::new(FailingConverter), &config_in(dir.path()));

        let err = exporter.export("https://github.com/a/b").await.unwrap_err();
        match err {
            Error::Conversion(e) => assert_eq!(e.details(), "repository not found\n"),
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn concurrency_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.max_concurrent = 2;
        let converter = Arc::new(CountingConverter {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let exporter = Arc::new(RepoExporter::new(converter.clone(), &config));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let exporter = exporter.clone();
            handles.push(tokio::spawn(async move {
                exporter.export("https://github.com/a/b").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(converter.peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn from_config_selects_converter() {
        let mut config = Config::default();
        assert_eq!(RepoExporter::from_config(&config).unwrap().converter_name(), "cli");

        config.export.mode = ConverterMode::InProcess;
        assert_eq!(
            RepoExporter::from_config(&config).unwrap().converter_name(),
            "in-process"
        );
    }
}
