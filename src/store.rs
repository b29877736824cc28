// On-disk state: config.json and credentials.json
//
// Both files are read fresh on every access and replaced wholesale on every
// write. Nothing is cached between calls.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::{ConfigRecord, CredentialRecord};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "MEERKAT_CONFIG_DIR";

const CONFIG_FILE: &str = "config.json";
const CREDENTIALS_FILE: &str = "credentials.json";

/// File-backed store for the configuration and credential records
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Store rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `$MEERKAT_CONFIG_DIR`, or `~/.config/meerkat`
    pub fn from_env() -> Result<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(Self::new(expand_tilde(dir.trim())));
            }
        }

        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::new(home.join(".config").join("meerkat")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Load the config record. Missing or unreadable files yield `None`.
    pub async fn load_config(&self) -> Option<ConfigRecord> {
        load_json(&self.config_path()).await
    }

    /// Replace the config record
    pub async fn save_config(&self, config: &ConfigRecord) -> Result<()> {
        self.ensure_dir().await?;
        write_json(&self.config_path(), config).await
    }

    /// Load the credential record. Missing or unreadable files yield `None`.
    pub async fn load_credentials(&self) -> Option<CredentialRecord> {
        load_json(&self.credentials_path()).await
    }

    /// Replace the credential record and restrict it to owner read/write
    pub async fn save_credentials(&self, credentials: &CredentialRecord) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.credentials_path();
        write_json(&path, credentials).await?;
        set_file_permissions(&path)?;
        tracing::debug!(
            path = %path.display(),
            expires_at = credentials.expires_at,
            "Saved credentials"
        );
        Ok(())
    }

    /// Remove the credential record. A missing file is not an error.
    pub async fn delete_credentials(&self) -> Result<()> {
        let path = self.credentials_path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted credentials");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create config directory {}", self.dir.display()))
    }
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "File not found");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read file, treating as absent");
            return None;
        }
    };

    match serde_json::from_str(&data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt JSON, treating as absent");
            None
        }
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize record")?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Set restrictive file permissions (0600 on Unix)
fn set_file_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
