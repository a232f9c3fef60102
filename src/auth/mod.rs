//! Authentication module for the Strava API
//!
//! Implements the OAuth2 authorization-code flow: a browser consent step,
//! a one-shot local listener for the redirect, and the code-for-token
//! exchange.

pub mod callback;
pub mod oauth;
pub mod tokens;

use anyhow::{Context, Result};
use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, Scope, TokenUrl};

use crate::config::Config;

pub use callback::{CallbackHandle, CallbackListener, ListenerState};
pub use oauth::{authorize, valid_access_token};
pub use tokens::{FileTokenStore, TokenRecord, TokenStore};

/// Strava application settings used by the authorization flow
pub struct AuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub redirect_url: RedirectUrl,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub scope: Scope,
}

impl AuthConfig {
    /// Build from configuration. Missing credentials or malformed URLs are
    /// reported before any network call is made.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (client_id, client_secret) = config.credentials()?;
        let base = config.oauth_base.trim_end_matches('/');

        Ok(Self {
            client_id: ClientId::new(client_id.to_string()),
            client_secret: ClientSecret::new(client_secret.to_string()),
            redirect_url: RedirectUrl::new(config.redirect_uri.clone())
                .context("Invalid redirect_uri")?,
            auth_url: AuthUrl::new(format!("{}/authorize", base))
                .context("Invalid oauth_base")?,
            token_url: TokenUrl::new(format!("{}/token", base)).context("Invalid oauth_base")?,
            scope: Scope::new(config.scope.clone()),
        })
    }

    /// Host and port the callback listener binds, taken from the redirect URI.
    pub fn callback_addr(&self) -> Result<(String, u16)> {
        let url = self.redirect_url.url();
        let host = url
            .host_str()
            .context("redirect_uri has no host")?
            .to_string();
        let port = url
            .port_or_known_default()
            .context("redirect_uri has no port")?;
        Ok((host, port))
    }
}
