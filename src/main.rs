//! hubfetch - video platform and GitHub fetcher with a repository export backend.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hubfetch::{
    Config, ConverterMode, Error, ExportClient, FileTokenStore, GitHubClient, RepoExporter,
    RepoSession, Result, VideoSession, api, converter, oauth,
};

/// Fetch channel and repository information, export repositories as text.
#[derive(Parser)]
#[command(name = "hubfetch", version, about = "Video platform and GitHub fetcher")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, env = "HUBFETCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the export backend.
    Serve {
        /// Address to bind the API server.
        #[arg(long, env = "HUBFETCH_BIND")]
        bind: Option<SocketAddr>,

        /// Convert inside the server process instead of spawning a converter.
        #[arg(long)]
        in_process: bool,
    },

    /// Convert a repository into `{repo}_content.txt` in the current directory.
    ///
    /// Prints the filename on success. On failure prints the reason on stderr
    /// and exits non-zero.
    Convert {
        /// Repository URL.
        url: String,

        /// GitHub API base URL.
        #[arg(long, env = "HUBFETCH_GITHUB_API")]
        api_base: Option<String>,

        /// GitHub request timeout in seconds.
        #[arg(long)]
        request_timeout: Option<u64>,
    },

    /// Show repository information, optionally exporting it through the backend.
    Repo {
        /// Repository URL.
        url: String,

        /// Download the exported content.
        #[arg(long)]
        download: bool,

        /// Directory the export is saved into.
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Export backend URL.
        #[arg(long, env = "HUBFETCH_BACKEND_URL")]
        backend_url: Option<String>,
    },

    /// Video platform login and channel lookup.
    Youtube {
        #[command(subcommand)]
        action: YoutubeAction,
    },
}

#[derive(Subcommand)]
enum YoutubeAction {
    /// Print the authorization URL to open in a browser.
    Authorize,

    /// Store the token from the redirect URL (or its fragment).
    Callback {
        /// Redirect URL or raw fragment.
        callback: String,
    },

    /// Show a channel and its videos.
    Fetch {
        /// Channel id.
        channel_id: String,
    },

    /// Forget the stored token.
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stderr of `convert` is read by the export backend as failure diagnostics
    if !matches!(cli.command, Commands::Convert { .. }) {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "hubfetch=info,tower_http=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind, in_process } => serve(config, bind, in_process).await,
        Commands::Convert {
            url,
            api_base,
            request_timeout,
        } => convert(config, &url, api_base, request_timeout).await,
        Commands::Repo {
            url,
            download,
            out,
            backend_url,
        } => show_repo(config, &url, download.then_some(out.as_path()), backend_url).await,
        Commands::Youtube { action } => youtube(config, action).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

/// Run the export backend until a termination signal arrives.
async fn serve(mut config: Config, bind: Option<SocketAddr>, in_process: bool) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    if in_process {
        config.export.mode = ConverterMode::InProcess;
    }
    config.validate()?;

    let config = Arc::new(config);
    let exporter = Arc::new(RepoExporter::from_config(&config)?);
    api::start_api_server(exporter, config, hubfetch::shutdown_signal()).await
}

async fn convert(
    config: Config,
    url: &str,
    api_base: Option<String>,
    request_timeout: Option<u64>,
) -> Result<()> {
    let mut github = config.github;
    if let Some(api_base) = api_base {
        github.api_base = api_base;
    }
    if let Some(secs) = request_timeout {
        github.request_timeout = Duration::from_secs(secs);
    }

    let client = GitHubClient::new(&github)?;
    let cwd = std::env::current_dir()?;
    let name = converter::export_repository(&client, url, &cwd).await?;
    println!("{}", name);
    Ok(())
}

async fn show_repo(
    config: Config,
    url: &str,
    download_to: Option<&Path>,
    backend_url: Option<String>,
) -> Result<()> {
    let backend = ExportClient::new(backend_url.unwrap_or(config.client.backend_url));
    let session = RepoSession::new(&config.github, backend)?;

    let metadata = match session.fetch_repo(url).await {
        Ok(metadata) => metadata,
        Err(e) => return Err(panel_error(e, session_error(&session).await)),
    };
    println!("{}", metadata.name);
    println!("  owner: {}", metadata.owner.login);
    println!("  stars: {}", metadata.stargazers_count);
    println!("  url:   {}", metadata.html_url);
    if let Some(description) = &metadata.description {
        println!("  {}", description);
    }

    if let Some(dir) = download_to {
        let path = match session.download_content(dir).await {
            Ok(path) => path,
            Err(e) => return Err(panel_error(e, session_error(&session).await)),
        };
        println!("saved {}", path.display());
    }
    Ok(())
}

async fn session_error(session: &RepoSession) -> Option<String> {
    session.snapshot().await.error
}

/// Prefer the panel's display message over the raw error
fn panel_error(error: Error, message: Option<String>) -> Error {
    match message {
        Some(message) => Error::Other(message),
        None => error,
    }
}

async fn youtube(config: Config, action: YoutubeAction) -> Result<()> {
    let store = Arc::new(FileTokenStore::new(config.client.token_path.clone()));
    let session = VideoSession::new(&config.youtube, store)?;

    match action {
        YoutubeAction::Authorize => {
            println!("{}", session.authorize_url()?);
        }
        YoutubeAction::Callback { callback } => {
            let Some(fragment) = oauth::callback_fragment(&callback) else {
                return Err(Error::Other("callback URL carries no fragment".into()));
            };
            if let Err(e) = session.handle_auth_callback(fragment).await {
                return Err(panel_error(e, session.snapshot().await.error));
            }
            println!("authorized");
        }
        YoutubeAction::Fetch { channel_id } => {
            if let Err(e) = session.fetch_data(&channel_id).await {
                return Err(panel_error(e, session.snapshot().await.error));
            }
            let snapshot = session.snapshot().await;
            if let Some(channel) = &snapshot.channel_info {
                println!("{}", channel.title);
                if let Some(subscribers) = &channel.subscriber_count {
                    println!("  subscribers: {}", subscribers);
                }
            }
            for video in &snapshot.videos {
                println!("  {}  {}", video.id, video.title);
            }
        }
        YoutubeAction::Logout => {
            session.logout().await?;
            println!("logged out");
        }
    }
    Ok(())
}
