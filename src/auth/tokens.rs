//! Token storage and management

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage;

/// The minimal credential record kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as epoch seconds
    pub expires_at: i64,
}

impl TokenRecord {
    /// Valid only while `expires_at` is strictly in the future.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.expires_at > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp())
    }
}

/// Render epoch seconds for the console, e.g. `2023-11-14 22:13:20 UTC`.
pub fn format_timestamp(epoch_secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}

/// Token store trait for different storage backends
pub trait TokenStore {
    /// The stored record, or `None` if there is none or it cannot be read.
    fn load(&self) -> Option<TokenRecord>;
    /// Replace the stored record.
    fn save(&self, record: &TokenRecord) -> Result<()>;
}

/// Token record kept as a JSON file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<TokenRecord> {
        match storage::load_json_if_exists(&self.path) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file: {:#}", e);
                None
            }
        }
    }

    fn save(&self, record: &TokenRecord) -> Result<()> {
        storage::save_json_private(&self.path, record)
    }
}
