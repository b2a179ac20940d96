//! API key lookup
//!
//! Order: `GOOGLE_API_KEY` environment variable, then the OS keyring, then a key file
//! in the config directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const SERVICE_NAME: &str = "article-narrator";
const API_KEY_USERNAME: &str = "google-api-key";
const API_KEY_FILE: &str = "api_key.txt";

fn api_key_file_path() -> Result<PathBuf> {
    Ok(crate::config::project_dirs()?.config_dir().join(API_KEY_FILE))
}

/// Resolve the generation API key
pub fn get_api_key() -> Result<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Ok(key);
        }
    }

    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if let Ok(key) = entry.get_password() {
            return Ok(key);
        }
    }

    let path = api_key_file_path()?;
    let key = fs::read_to_string(&path).with_context(|| {
        format!(
            "{} environment variable is not set and no stored key was found. \
             Run 'narrate config --set-api-key YOUR_KEY' first.",
            API_KEY_ENV
        )
    })?;
    Ok(key.trim().to_string())
}

/// Store the API key - tries keyring first, falls back to file
pub fn set_api_key(key: &str) -> Result<()> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if entry.set_password(key).is_ok() && keyring_holds(key) {
            return Ok(());
        }
    }

    let path = api_key_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    fs::write(&path, key).context("Failed to write API key file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set file permissions")?;
    }

    println!("Note: Using file-based storage (keyring unavailable)");
    Ok(())
}

// Without a platform backend the keyring store is in-memory only
fn keyring_holds(key: &str) -> bool {
    keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME)
        .and_then(|entry| entry.get_password())
        .map(|stored| stored == key)
        .unwrap_or(false)
}
