//! External converter process

use super::traits::Converter;
use crate::config::{ExportConfig, GitHubConfig};
use crate::error::{ConversionError, Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Configuration file variable read by the `hubfetch` binary
const CONFIG_ENV: &str = "HUBFETCH_CONFIG";

/// GitHub API override variable read by `hubfetch convert`
const GITHUB_API_ENV: &str = "HUBFETCH_GITHUB_API";

/// Bare program names are looked up in PATH; paths are used as given
fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() != 1 || program.is_absolute() {
        return Ok(program.to_path_buf());
    }
    which::which(program).map_err(|e| Error::Config {
        message: format!("converter {} not found in PATH: {}", program.display(), e),
        key: Some("export.converter_path".into()),
    })
}

/// Converter that runs an external program per request
///
/// The repository URL is passed as its own argv element after any configured
/// prefix arguments; no shell is involved. The program runs with the request
/// directory as its working directory and must print the artifact filename on
/// stdout.
#[derive(Debug, Clone)]
pub struct CliConverter {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
    fail_on_stderr: bool,
    removed_env: Vec<String>,
}

impl CliConverter {
    /// Create a converter for `program` with no prefix arguments
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
            fail_on_stderr: true,
            removed_env: Vec::new(),
        }
    }

    /// Arguments placed before the repository URL
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Kill the converter if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether output on stderr fails the conversion even on exit status 0
    pub fn fail_on_stderr(mut self, fail: bool) -> Self {
        self.fail_on_stderr = fail;
        self
    }

    /// Unset `name` in the converter's environment
    pub fn without_env(mut self, name: impl Into<String>) -> Self {
        self.removed_env.push(name.into());
        self
    }

    /// Run `exe convert` with the given GitHub settings on its command line
    ///
    /// The child gets no configuration file: its working directory is the
    /// request directory, so an inherited relative `HUBFETCH_CONFIG` would
    /// not resolve. Everything the conversion needs is passed as flags.
    pub fn own_binary(exe: PathBuf, github: &GitHubConfig) -> Self {
        Self::new(exe)
            .with_args(vec![
                "convert".into(),
                "--api-base".into(),
                github.api_base.clone(),
                "--request-timeout".into(),
                github.request_timeout.as_secs().to_string(),
                "--".into(),
            ])
            .without_env(CONFIG_ENV)
            .without_env(GITHUB_API_ENV)
    }

    /// Build from configuration
    ///
    /// Without an explicit `export.converter_path` the running executable is
    /// used with its `convert` subcommand (see [`CliConverter::own_binary`]).
    /// A bare program name is looked up in PATH.
    pub fn from_config(export: &ExportConfig, github: &GitHubConfig) -> Result<Self> {
        let converter = match &export.converter_path {
            Some(program) => {
                Self::new(resolve_program(program)?).with_args(export.converter_args.clone())
            }
            None => {
                let exe = std::env::current_exe().map_err(|e| Error::Config {
                    message: format!("cannot locate own executable: {}", e),
                    key: Some("export.converter_path".into()),
                })?;
                Self::own_binary(exe, github)
            }
        };
        Ok(converter
            .with_timeout(export.timeout)
            .fail_on_stderr(export.fail_on_stderr))
    }

    /// Program that will be executed
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Converter for CliConverter {
    async fn convert(&self, repo_url: &str, work_dir: &Path) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(repo_url)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for name in &self.removed_env {
            command.env_remove(name);
        }

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| ConversionError::TimedOut {
                    seconds: timeout.as_secs(),
                })?,
            None => command.output().await,
        }
        .map_err(|e| ConversionError::Spawn {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::error!(
                program = ?self.program,
                code = ?output.status.code(),
                stderr = %stderr.trim(),
                "converter failed"
            );
            return Err(ConversionError::Failed {
                exit_code: output.status.code(),
                stderr,
            }
            .into());
        }

        if !stderr.trim().is_empty() {
            if self.fail_on_stderr {
                tracing::error!(program = ?self.program, stderr = %stderr.trim(), "converter reported errors");
                return Err(ConversionError::Stderr { stderr }.into());
            }
            tracing::warn!(program = ?self.program, stderr = %stderr.trim(), "converter wrote to stderr");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &'static str {
        "cli"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_program_names_are_looked_up_in_path() {
        assert_eq!(
            resolve_program(Path::new("sh")).ok(),
            which::which("sh").ok()
        );
        assert_eq!(
            resolve_program(Path::new("./bin/convert")).unwrap(),
            PathBuf::from("./bin/convert")
        );

        let err = resolve_program(Path::new("nonexistent-converter-binary-xyz")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn from_config_forwards_github_settings_to_own_binary() {
        let github = GitHubConfig {
            api_base: "http://127.0.0.1:4010".into(),
            request_timeout: Duration::from_secs(12),
        };
        let converter = CliConverter::from_config(&ExportConfig::default(), &github).unwrap();

        assert_eq!(
            converter.args,
            vec![
                "convert",
                "--api-base",
                "http://127.0.0.1:4010",
                "--request-timeout",
                "12",
                "--"
            ]
        );
        assert!(converter.removed_env.iter().any(|v| v == "HUBFETCH_CONFIG"));
        assert_eq!(converter.timeout, Some(Duration::from_secs(300)));
        assert!(converter.fail_on_stderr);
    }

    #[test]
    fn from_config_uses_explicit_program() {
        let config = ExportConfig {
            converter_path: Some(PathBuf::from("/opt/tools/github2file")),
            converter_args: vec!["--quiet".into()],
            timeout: None,
            fail_on_stderr: false,
            ..Default::default()
        };
        let converter = CliConverter::from_config(&config, &GitHubConfig::default()).unwrap();
        assert_eq!(converter.program(), Path::new("/opt/tools/github2file"));
        assert_eq!(converter.args, vec!["--quiet".to_string()]);
        assert!(converter.removed_env.is_empty());
        assert_eq!(converter.timeout, None);
        assert!(!converter.fail_on_stderr);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn removed_variables_do_not_reach_converter() {
        let dir = tempfile::tempdir().unwrap();
        let converter = CliConverter::new(PathBuf::from("sh"))
            .with_args(vec![
                "-c".into(),
                r#"printf '%s' "${HOME-unset}""#.into(),
                "converter".into(),
            ])
            .without_env("HOME");

        assert_eq!(converter.convert("u", dir.path()).await.unwrap(), "unset");
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let converter = CliConverter::new(PathBuf::from("/nonexistent/path/to/converter"));

        let err = converter
            .convert("https://github.com/a/b", dir.path())
            .await
            .unwrap_err();
        match err {
            Error::Conversion(ConversionError::Spawn { program, .. }) => {
                assert_eq!(program, PathBuf::from("/nonexistent/path/to/converter"));
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn url_is_a_single_argument() {
        let dir = tempfile::tempdir().unwrap();
        // printf echoes its first argument back; a shell would split or expand it
        let converter = CliConverter::new(PathBuf::from("sh"))
            .with_args(vec!["-c".into(), r#"printf '%s' "$1""#.into(), "converter".into()]);
        let hostile = "https://github.com/a/b\"; touch pwned; echo \"$(id)";

        let out = converter.convert(hostile, dir.path()).await.unwrap();
        assert_eq!(out, hostile);
        assert!(!dir.path().join("pwned").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let converter = CliConverter::new(PathBuf::from("sh"))
            .with_args(vec!["-c".into(), "pwd".into(), "converter".into()]);

        let out = converter.convert("u", dir.path()).await.unwrap();
        let reported = std::fs::canonicalize(out.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_policy() {
        let dir = tempfile::tempdir().unwrap();
        let script = vec![
            "-c".to_string(),
            "echo note >&2; echo out.txt".to_string(),
            "converter".to_string(),
        ];

        let strict = CliConverter::new(PathBuf::from("sh")).with_args(script.clone());
        match strict.convert("u", dir.path()).await.unwrap_err() {
            Error::Conversion(ConversionError::Stderr { stderr }) => assert_eq!(stderr, "note\n"),
            other => panic!("expected stderr error, got {:?}", other),
        }

        let lenient = CliConverter::new(PathBuf::from("sh"))
            .with_args(script)
            .fail_on_stderr(false);
        assert_eq!(lenient.convert("u", dir.path()).await.unwrap(), "out.txt\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_slow_converter() {
        let dir = tempfile::tempdir().unwrap();
        let converter = CliConverter::new(PathBuf::from("sh"))
            .with_args(vec!["-c".into(), "sleep 5".into(), "converter".into()])
            .with_timeout(Some(Duration::from_millis(200)));

        let err = converter.convert("u", dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion(ConversionError::TimedOut { .. })
        ));
    }
}
