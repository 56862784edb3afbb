//! Video-platform panel: OAuth login, channel and video lookup

use super::Ticket;
use crate::config::YouTubeConfig;
use crate::error::{Error, Result};
use crate::oauth::{self, CallbackOutcome};
use crate::token_store::TokenStore;
use crate::types::{BearerToken, ChannelInfo, VideoSummary};
use crate::youtube::{self, YouTubeClient};
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Read-only view of a [`VideoSession`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSnapshot {
    /// Whether a token is held
    pub is_authorized: bool,
    /// Channel from the latest successful lookup
    pub channel_info: Option<ChannelInfo>,
    /// Videos from the latest successful search
    pub videos: Vec<VideoSummary>,
    /// A request is in flight
    pub is_loading: bool,
    /// Message for the latest failure
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct VideoState {
    token: Option<BearerToken>,
    channel_info: Option<ChannelInfo>,
    videos: Vec<VideoSummary>,
    is_loading: bool,
    error: Option<String>,
    seq: Ticket,
}

struct VideoInner {
    client: YouTubeClient,
    oauth: YouTubeConfig,
    store: Arc<dyn TokenStore>,
    state: RwLock<VideoState>,
}

/// Session for the video-platform panel
#[derive(Clone)]
pub struct VideoSession {
    inner: Arc<VideoInner>,
}

impl VideoSession {
    /// Create a session, picking up any token already in `store`
    pub fn new(config: &YouTubeConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let token = store.load()?;
        Ok(Self {
            inner: Arc::new(VideoInner {
                client: YouTubeClient::new(config)?,
                oauth: config.clone(),
                store,
                state: RwLock::new(VideoState {
                    token,
                    ..Default::default()
                }),
            }),
        })
    }

    /// URL the user agent must navigate to in order to log in
    pub fn authorize_url(&self) -> Result<Url> {
        oauth::authorization_url(&self.inner.oauth)
    }

    /// Process the redirect callback (raw fragment or full callback URL)
    ///
    /// Call once per callback; callers gate this on a fragment being present
    /// (see [`oauth::callback_fragment`]).
    pub async fn handle_auth_callback(&self, callback: &str) -> Result<()> {
        match oauth::parse_callback(callback) {
            CallbackOutcome::Token(token) => {
                self.inner.store.save(&token)?;
                let mut state = self.inner.state.write().await;
                state.token = Some(token);
                state.error = None;
                tracing::info!("video platform token stored");
                Ok(())
            }
            CallbackOutcome::Denied(reason) => {
                let error = Error::Authentication(reason);
                self.inner.state.write().await.error = Some(youtube::panel_message(&error));
                tracing::warn!(error = %error, "authorization callback without token");
                Err(error)
            }
        }
    }

    /// Look up a channel and its videos
    ///
    /// Fails with [`Error::Unauthorized`] before any network call when no
    /// token is held. The video search is only issued when the channel lookup
    /// returned at least one channel.
    pub async fn fetch_data(&self, channel_id: &str) -> Result<()> {
        let (ticket, token) = {
            let mut state = self.inner.state.write().await;
            let Some(token) = state.token.clone() else {
                state.error = Some(youtube::panel_message(&Error::Unauthorized));
                return Err(Error::Unauthorized);
            };
            state.seq += 1;
            state.is_loading = true;
            state.error = None;
            state.channel_info = None;
            state.videos.clear();
            (state.seq, token)
        };

        let outcome = self.load_channel(ticket, &token, channel_id).await;
        self.finish(ticket, outcome).await
    }

    async fn load_channel(&self, ticket: Ticket, token: &BearerToken, channel_id: &str) -> Result<()> {
        let client = &self.inner.client;

        let channel = client
            .channels(token, channel_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ChannelNotFound(channel_id.to_string()))?;

        if !self.apply(ticket, |s| s.channel_info = Some(channel)).await {
            return Ok(());
        }

        let videos = client.search_videos(token, channel_id).await?;
        tracing::debug!(channel_id, count = videos.len(), "videos fetched");
        self.apply(ticket, |s| s.videos = videos).await;
        Ok(())
    }

    /// Run `update` only if `ticket` is still the latest request
    async fn apply(&self, ticket: Ticket, update: impl FnOnce(&mut VideoState)) -> bool {
        let mut state = self.inner.state.write().await;
        if state.seq != ticket {
            tracing::debug!(ticket, latest = state.seq, "discarding superseded result");
            return false;
        }
        update(&mut state);
        true
    }

    async fn finish(&self, ticket: Ticket, outcome: Result<()>) -> Result<()> {
        let mut state = self.inner.state.write().await;
        if state.seq == ticket {
            state.is_loading = false;
            if let Err(e) = &outcome {
                tracing::warn!(error = %e, "video platform fetch failed");
                state.error = Some(youtube::panel_message(e));
            }
        }
        outcome
    }

    /// Drop the token and everything derived from it; idempotent
    pub async fn logout(&self) -> Result<()> {
        {
            let mut state = self.inner.state.write().await;
            let seq = state.seq + 1;
            *state = VideoState {
                seq,
                ..Default::default()
            };
        }
        self.inner.store.clear()
    }

    /// Whether a token is held
    pub async fn is_authorized(&self) -> bool {
        self.inner.state.read().await.token.is_some()
    }

    /// Current state
    pub async fn snapshot(&self) -> VideoSnapshot {
        let state = self.inner.state.read().await;
        VideoSnapshot {
            is_authorized: state.token.is_some(),
            channel_info: state.channel_info.clone(),
            videos: state.videos.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}
