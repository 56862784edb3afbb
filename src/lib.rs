//! # hubfetch
//!
//! Fetches public information from the video platform and from GitHub, and
//! exports a GitHub repository into a single downloadable text file.
//!
//! ## Components
//!
//! - **Export backend** ([`api`]) - `POST /download-repo` runs a converter for a
//!   repository URL and returns the file it produced
//! - **Converter** ([`converter`]) - turns a repository URL into a text file,
//!   either as the `hubfetch convert` subprocess or in-process
//! - **Panels** ([`session`]) - per-session state for the video platform and
//!   repository views, with OAuth login and a persisted token
//!
//! ## Quick Start
//!
//! ```no_run
//! use hubfetch::{Config, RepoExporter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let exporter = Arc::new(RepoExporter::from_config(&config)?);
//!
//!     let artifact = exporter.export("https://github.com/rust-lang/cargo").await?;
//!     println!("{} ({} bytes)", artifact.file_name, artifact.contents.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Repository-to-text conversion
pub mod converter;
/// Error types
pub mod error;
/// Export pipeline and converter implementations
pub mod export;
/// GitHub REST client
pub mod github;
/// OAuth implicit-grant helpers
pub mod oauth;
/// Per-panel session state
pub mod session;
/// Bearer token persistence
pub mod token_store;
/// Core types
pub mod types;
/// Video platform Data API client
pub mod youtube;

// Re-export commonly used types
pub use config::{Config, ConverterMode};
pub use error::{ApiError, ArtifactError, ConversionError, Error, RemoteFailure, Result, ToHttpStatus};
pub use export::{CliConverter, Converter, ExportArtifact, ExportClient, InProcessConverter, RepoExporter};
pub use github::GitHubClient;
pub use session::{RepoSession, RepoSnapshot, VideoSession, VideoSnapshot};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{BearerToken, ChannelInfo, RepoRef, RepositoryMetadata, VideoSummary};
pub use youtube::YouTubeClient;

/// Resolves when the process receives a termination signal
///
/// Pass it to [`api::start_api_server`] for graceful shutdown. On unix this
/// is SIGTERM or SIGINT; elsewhere Ctrl+C.
pub async fn shutdown_signal() {
    let name = termination().await;
    tracing::info!(signal = name, "shutting down");
}

#[cfg(unix)]
async fn termination() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    // registration can fail in sandboxes; a missing stream just never fires
    let listen = |kind: SignalKind, name: &'static str| match signal(kind) {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!(signal = name, error = %e, "signal handler unavailable");
            None
        }
    };
    let mut term = listen(SignalKind::terminate(), "SIGTERM");
    let mut int = listen(SignalKind::interrupt(), "SIGINT");

    if term.is_none() && int.is_none() {
        return ctrl_c().await;
    }

    async fn next(stream: &mut Option<tokio::signal::unix::Signal>) {
        match stream {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    tokio::select! {
        _ = next(&mut term) => "SIGTERM",
        _ = next(&mut int) => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn termination() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
    "ctrl_c"
}
