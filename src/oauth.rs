//! OAuth 2.0 implicit grant helpers
//!
//! The authorization server returns the access token directly in the
//! redirect URL fragment, so there is no code exchange step.

use crate::config::YouTubeConfig;
use crate::error::{Error, Result};
use crate::types::BearerToken;
use url::Url;

/// Result of parsing a redirect callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The fragment carried an access token
    Token(BearerToken),
    /// No token; the provider's `error` parameter, or "Unknown error"
    Denied(String),
}

/// Build the authorization URL the user agent must navigate to
pub fn authorization_url(config: &YouTubeConfig) -> Result<Url> {
    if config.client_id.trim().is_empty() {
        return Err(Error::Config {
            message: "an OAuth client id is required to authorize".into(),
            key: Some("youtube.client_id".into()),
        });
    }

    Url::parse_with_params(
        &config.auth_endpoint,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("response_type", "token"),
            ("scope", config.scope.as_str()),
        ],
    )
    .map_err(|e| Error::Config {
        message: format!("invalid authorization endpoint: {}", e),
        key: Some("youtube.auth_endpoint".into()),
    })
}

/// Extract the fragment from a callback URL or raw fragment string
///
/// Returns `None` when there is nothing to process, which is how callers
/// decide whether a callback happened at all.
pub fn callback_fragment(input: &str) -> Option<&str> {
    let fragment = match input.split_once('#') {
        Some((_, fragment)) => fragment,
        None if input.contains("://") => return None,
        None => input,
    };
    let fragment = fragment.trim();
    if fragment.is_empty() {
        None
    } else {
        Some(fragment)
    }
}

/// Parse `access_token` / `error` out of a callback fragment
pub fn parse_callback(fragment: &str) -> CallbackOutcome {
    let fragment = callback_fragment(fragment).unwrap_or("");
    let mut token = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" if !value.is_empty() => token = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match token {
        Some(token) => CallbackOutcome::Token(BearerToken::new(token)),
        None => CallbackOutcome::Denied(error.unwrap_or_else(|| "Unknown error".to_string())),
    }
}
