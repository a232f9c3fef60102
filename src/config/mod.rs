//! Configuration and file locations

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/exchange_token";
pub const DEFAULT_SCOPE: &str = "activity:read_all";
pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_OAUTH_BASE: &str = "https://www.strava.com/oauth";

const TOKEN_FILE: &str = "token.json";
const COMPILATION_FILE: &str = "Comprehensive_stream_data.json";
const COLLECTION_FILE: &str = "activity_stream_compilation.json";
const ZONES_FILE: &str = "hr_zones.json";
const ACTIVITY_IDS_FILE: &str = "activity_ids.json";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Strava API application client ID
    pub client_id: Option<String>,
    /// Strava API application client secret
    pub client_secret: Option<String>,
    /// Redirect URI registered with the Strava application; the callback
    /// listener binds to its host and port
    pub redirect_uri: String,
    /// Requested OAuth scope
    pub scope: String,
    /// Directory holding the token file and all downloaded JSON
    pub data_dir: PathBuf,
    /// REST API base URL
    pub api_base: String,
    /// OAuth base URL (`/authorize` and `/token` live under it)
    pub oauth_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            data_dir: PathBuf::from("json_dump"),
            api_base: DEFAULT_API_BASE.to_string(),
            oauth_base: DEFAULT_OAUTH_BASE.to_string(),
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "strava-hr", "strava-hr")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var("STRAVA_CLIENT_ID").ok(),
            std::env::var("STRAVA_CLIENT_SECRET").ok(),
        );
        Ok(config)
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Replace client credentials with non-empty override values.
    pub fn apply_overrides(&mut self, client_id: Option<String>, client_secret: Option<String>) {
        if let Some(id) = client_id.filter(|s| !s.trim().is_empty()) {
            self.client_id = Some(id);
        }
        if let Some(secret) = client_secret.filter(|s| !s.trim().is_empty()) {
            self.client_secret = Some(secret);
        }
    }

    /// Client credentials, or a configuration error naming where to put them.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|s| !s.is_empty());
        let secret = self.client_secret.as_deref().filter(|s| !s.is_empty());
        match (id, secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => bail!(
                "Missing Strava client credentials. Set client_id and client_secret in {} \
                 or STRAVA_CLIENT_ID / STRAVA_CLIENT_SECRET.",
                Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string())
            ),
        }
    }

    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }

    pub fn activities_path(&self, year: i32) -> PathBuf {
        self.data_dir.join(format!("activities_{}.json", year))
    }

    pub fn compilation_path(&self) -> PathBuf {
        self.data_dir.join(COMPILATION_FILE)
    }

    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join(COLLECTION_FILE)
    }

    pub fn zones_path(&self) -> PathBuf {
        self.data_dir.join(ZONES_FILE)
    }

    pub fn activity_ids_path(&self) -> PathBuf {
        self.data_dir.join(ACTIVITY_IDS_FILE)
    }
}
