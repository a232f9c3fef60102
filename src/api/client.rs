//! Authenticated HTTP client for the Strava REST API

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::Config;

/// Transport-level failure from the Strava API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("401 Unauthorized for {url}. Token may be invalid -- run 'strava-auth'.")]
    Unauthorized { url: String },
    #[error("HTTP {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },
}

/// Bearer-token client for the Strava API.
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl StravaClient {
    /// Build a client for `api_base`. A leading `Bearer ` (any case) on the token is
    /// dropped; an empty token is a configuration error.
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let token = token.trim_start();
        let token = match token.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => &token[7..],
            _ => token,
        }
        .trim();
        anyhow::ensure!(!token.is_empty(), "No Strava access token provided.");

        Ok(Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &Config, token: &str) -> Result<Self> {
        Self::new(&config.api_base, token)
    }

    /// GET `path` relative to the API base and parse the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let resp = check_response(resp, &url).await?;
        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    Ok(resp)
}
