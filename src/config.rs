//! Configuration types for hubfetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Main configuration
///
/// Fields are organized into sub-configs:
/// - [`server`](ApiConfig) - export backend bind address and CORS
/// - [`export`](ExportConfig) - converter invocation and artifact handling
/// - [`github`](GitHubConfig) - code-hosting API endpoint
/// - [`youtube`](YouTubeConfig) - video-platform API and OAuth settings
/// - [`client`](ClientConfig) - where the CLI finds the backend and token cache
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Export backend HTTP settings
    #[serde(default)]
    pub server: ApiConfig,

    /// Export pipeline settings
    #[serde(default)]
    pub export: ExportConfig,

    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// YouTube API and OAuth settings
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Client-side settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("cannot parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde defaults cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.export.max_concurrent == 0 {
            return Err(Error::Config {
                message: "must be at least 1".into(),
                key: Some("export.max_concurrent".into()),
            });
        }
        if self.export.mode == ConverterMode::External
            && self.export.converter_path.is_none()
            && !self.export.converter_args.is_empty()
        {
            return Err(Error::Config {
                message: "converter_args require converter_path".into(),
                key: Some("export.converter_args".into()),
            });
        }
        Ok(())
    }
}

/// Export backend HTTP configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3001)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

/// How the export pipeline produces artifacts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterMode {
    /// Run an external converter program per request
    #[default]
    External,
    /// Perform the conversion inside the server process
    InProcess,
}

/// Export pipeline configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Converter selection (default: external)
    #[serde(default)]
    pub mode: ConverterMode,

    /// Path to the converter executable
    ///
    /// When unset, the running `hubfetch` binary is used with its `convert`
    /// subcommand.
    #[serde(default)]
    pub converter_path: Option<PathBuf>,

    /// Arguments placed before the repository URL (e.g. a script path)
    #[serde(default)]
    pub converter_args: Vec<String>,

    /// Base directory for per-request artifact directories (default: "./exports")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Converter timeout in seconds (default: 300, null = no timeout)
    #[serde(default = "default_converter_timeout", with = "secs::option")]
    pub timeout: Option<Duration>,

    /// Maximum simultaneous conversions (default: 4)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Treat any converter stderr output as failure (default: true)
    #[serde(default = "default_true")]
    pub fail_on_stderr: bool,

    /// Keep request directories after the artifact is sent (default: false)
    #[serde(default)]
    pub keep_artifacts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mode: ConverterMode::default(),
            converter_path: None,
            converter_args: Vec::new(),
            work_dir: default_work_dir(),
            timeout: default_converter_timeout(),
            max_concurrent: default_max_concurrent(),
            fail_on_stderr: true,
            keep_artifacts: false,
        }
    }
}

/// GitHub API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL (default: https://api.github.com)
    #[serde(default = "default_github_api")]
    pub api_base: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout", with = "secs")]
    pub request_timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// YouTube Data API and OAuth configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Data API base URL (default: https://www.googleapis.com/youtube/v3)
    #[serde(default = "default_youtube_api")]
    pub api_base: String,

    /// Implicit-grant authorization endpoint
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,

    /// OAuth client identifier (required for authorization)
    #[serde(default)]
    pub client_id: String,

    /// Redirect target registered for the client
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Requested scope
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout", with = "secs")]
    pub request_timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: default_youtube_api(),
            auth_endpoint: default_auth_endpoint(),
            client_id: String::new(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Client-side configuration used by the CLI sessions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Export backend base URL (default: http://localhost:3001)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Token cache file (default: ".hubfetch/token.json")
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            token_path: default_token_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3001))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("./exports")
}

fn default_converter_timeout() -> Option<Duration> {
    Some(Duration::from_secs(300))
}

fn default_max_concurrent() -> usize {
    4
}

fn default_github_api() -> String {
    "https://api.github.com".into()
}

fn default_youtube_api() -> String {
    "https://www.googleapis.com/youtube/v3".into()
}

fn default_auth_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".into()
}

fn default_redirect_uri() -> String {
    "http://localhost:5173/oauth2callback".into()
}

fn default_scope() -> String {
    "https://www.googleapis.com/auth/youtube.force-ssl".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_backend_url() -> String {
    "http://localhost:3001".into()
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".hubfetch/token.json")
}

/// Durations are whole seconds in the config file
mod secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, out: S) -> Result<S::Ok, S::Error> {
        value.as_secs().serialize(out)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(input: D) -> Result<Duration, D::Error> {
        u64::deserialize(input).map(Duration::from_secs)
    }

    /// `null` or absent means no limit
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            out: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(|d| d.as_secs()).serialize(out)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            input: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(input)?.map(Duration::from_secs))
        }
    }
}
