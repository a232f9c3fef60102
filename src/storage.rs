//! JSON file persistence helpers

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read and parse a JSON file. A missing file is an error.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("File not found or unreadable: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Read and parse a JSON file, returning `None` when it does not exist.
pub fn load_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    load_json(path).map(Some)
}

/// Write a value as pretty-printed JSON, creating parent directories.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Like [`save_json`], but restricts the file to the owner (it holds tokens).
pub fn save_json_private<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    save_json(path, value)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).context("Failed to set token file permissions")?;
    }

    Ok(())
}
