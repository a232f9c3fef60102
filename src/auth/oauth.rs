//! OAuth2 authorization-code flow against Strava

use anyhow::{bail, Context, Result};
use oauth2::AuthorizationCode;
use serde_json::{Map, Value};
use url::Url;

use super::callback::CallbackListener;
use super::tokens::{format_timestamp, FileTokenStore, TokenRecord, TokenStore};
use super::AuthConfig;
use crate::config::Config;

/// Build the authorize URL. `approval_prompt=force` re-prompts consent on
/// every run instead of reusing an earlier grant.
pub fn authorization_url(auth: &AuthConfig) -> Url {
    let mut url = auth.auth_url.url().clone();
    url.query_pairs_mut()
        .append_pair("client_id", auth.client_id.as_str())
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", auth.redirect_url.url().as_str())
        .append_pair("approval_prompt", "force")
        .append_pair("scope", auth.scope.as_str());
    url
}

/// Print the authorize URL and try to open it in the default browser.
pub fn open_authorization_url(auth: &AuthConfig) -> Url {
    let url = authorization_url(auth);
    println!("Opening browser to:\n  {}\n", url);
    if let Err(e) = webbrowser::open(url.as_str()) {
        tracing::warn!("Failed to open browser: {}", e);
        println!("Open the URL above manually to continue.");
    }
    url
}

/// Exchange a one-time authorization code for a token record.
///
/// Every field of the response is printed; only `access_token`,
/// `refresh_token` and `expires_at` are kept.
pub async fn exchange_code(
    http: &reqwest::Client,
    auth: &AuthConfig,
    code: &AuthorizationCode,
) -> Result<TokenRecord> {
    let params = [
        ("client_id", auth.client_id.as_str()),
        ("client_secret", auth.client_secret.secret().as_str()),
        ("code", code.secret().as_str()),
        ("grant_type", "authorization_code"),
    ];

    println!("\nExchanging code for access token...");
    tracing::debug!("POST {}", auth.token_url.url());

    let resp = http
        .post(auth.token_url.url().clone())
        .form(&params)
        .send()
        .await
        .context("Token exchange request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("Token exchange failed (HTTP {}): {}", status.as_u16(), body);
    }

    let body: Map<String, Value> = resp
        .json()
        .await
        .context("Failed to parse token response")?;
    print_token_response(&body);

    serde_json::from_value(Value::Object(body))
        .context("Token response missing access_token, refresh_token or expires_at")
}

/// Exchange the code and overwrite the stored token record.
pub async fn exchange_and_store(
    http: &reqwest::Client,
    auth: &AuthConfig,
    code: &AuthorizationCode,
    store: &impl TokenStore,
) -> Result<TokenRecord> {
    let record = exchange_code(http, auth, code).await?;
    store.save(&record)?;
    Ok(record)
}

fn print_token_response(body: &Map<String, Value>) {
    println!("\nToken response:");
    for (key, value) in body {
        let shown = match (key.as_str(), value) {
            ("expires_at", Value::Number(n)) => n
                .as_i64()
                .map(format_timestamp)
                .unwrap_or_else(|| n.to_string()),
            (_, Value::String(s)) => s.clone(),
            (_, other) => other.to_string(),
        };
        println!("  {:12}: {}", key, shown);
    }
}

/// Run a full authorization cycle and persist the resulting token record.
pub async fn authorize(config: &Config) -> Result<TokenRecord> {
    let auth = AuthConfig::from_config(config)?;
    let (host, port) = auth.callback_addr()?;

    // Bind before opening the browser so the redirect cannot arrive first.
    let listener = CallbackListener::bind(&host, port).await?;
    let handle = listener.spawn();

    open_authorization_url(&auth);
    println!("Waiting for you to finish the authorization in your browser...");

    let code = handle.wait().await?;
    println!("\nReceived authorization code.");

    let store = FileTokenStore::new(config.token_path());
    let record = exchange_and_store(&reqwest::Client::new(), &auth, &code, &store).await?;
    println!("\nTokens written to {}", store.path().display());
    Ok(record)
}

/// Stored access token if still valid, otherwise a fresh authorization.
pub async fn valid_access_token(config: &Config) -> Result<String> {
    let store = FileTokenStore::new(config.token_path());
    if let Some(token) = store
        .load()
        .filter(|t| !t.access_token.is_empty() && t.is_valid())
    {
        tracing::debug!(
            "Using stored token (expires {})",
            format_timestamp(token.expires_at)
        );
        return Ok(token.access_token);
    }

    tracing::info!("No valid token found, launching OAuth flow...");
    Ok(authorize(config).await?.access_token)
}
