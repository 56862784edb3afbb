//! YouTube Data API v3 client (bearer-authenticated)

use crate::config::YouTubeConfig;
use crate::error::{Error, RemoteFailure, Result};
use crate::types::{BearerToken, ChannelInfo, VideoSummary};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Maximum number of videos requested from the search endpoint
pub const SEARCH_RESULT_CAP: u32 = 50;

/// Shown when the request went out but nothing came back
pub const NO_RESPONSE_MESSAGE: &str =
    "No response received from YouTube API. Please check your internet connection.";

/// Shown when an authenticated call is attempted without a token
pub const UNAUTHORIZED_MESSAGE: &str = "Not authorized. Please login first.";

/// Shown when the channel lookup returns nothing
pub const NO_CHANNEL_MESSAGE: &str = "No channel found with the provided ID.";

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ChannelStatistics {
    #[serde(rename = "subscriberCount", default)]
    subscriber_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    title: String,
}

/// Client for the channel and search endpoints
#[derive(Clone, Debug)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_base: String,
}

impl YouTubeClient {
    /// Create a client from configuration
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Look up channels by ID (`GET /channels?part=snippet,statistics&id=…`)
    pub async fn channels(&self, token: &BearerToken, channel_id: &str) -> Result<Vec<ChannelInfo>> {
        let url = format!("{}/channels", self.api_base);
        let response: ChannelListResponse = self
            .get_json(
                &url,
                token,
                &[("part", "snippet,statistics"), ("id", channel_id)],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| ChannelInfo {
                title: item.snippet.title,
                subscriber_count: item.statistics.and_then(|s| s.subscriber_count),
            })
            .collect())
    }

    /// Search a channel's videos, capped at [`SEARCH_RESULT_CAP`] results
    pub async fn search_videos(
        &self,
        token: &BearerToken,
        channel_id: &str,
    ) -> Result<Vec<VideoSummary>> {
        let url = format!("{}/search", self.api_base);
        let cap = SEARCH_RESULT_CAP.to_string();
        let response: SearchResponse = self
            .get_json(
                &url,
                token,
                &[
                    ("part", "snippet"),
                    ("channelId", channel_id),
                    ("type", "video"),
                    ("maxResults", cap.as_str()),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| {
                item.id.video_id.map(|id| VideoSummary {
                    id,
                    title: item.snippet.title,
                })
            })
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &BearerToken,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| Error::Remote(RemoteFailure::classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            // Google error bodies: {"error": {"code": 403, "message": "..."}}
            let body: Option<serde_json::Value> = response.json().await.ok();
            let message = body
                .as_ref()
                .and_then(|b| b.pointer("/error/message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string()
                });
            return Err(Error::Remote(RemoteFailure::Status {
                status: status.as_u16(),
                message,
            }));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Remote(RemoteFailure::classify(&e)))
    }
}

/// Render an error the way the video panel displays it
pub fn panel_message(error: &Error) -> String {
    match error {
        Error::Remote(RemoteFailure::Status { status, message }) => {
            format!("Error {}: {}", status, message)
        }
        Error::Remote(RemoteFailure::NoResponse(_)) => NO_RESPONSE_MESSAGE.to_string(),
        Error::Remote(RemoteFailure::Setup(msg)) => format!("Error fetching YouTube data: {}", msg),
        Error::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
        Error::ChannelNotFound(_) => NO_CHANNEL_MESSAGE.to_string(),
        Error::Authentication(reason) => format!("Authentication failed: {}", reason),
        other => format!("Error fetching YouTube data: {}", other),
    }
}
