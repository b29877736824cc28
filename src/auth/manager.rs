use chrono::{DateTime, Utc};
use reqwest::Client;

use super::provider;
use crate::error::{CliError, Result};
use crate::models::CredentialRecord;
use crate::store::Store;

/// Refresh when the access token has this many seconds left or fewer
pub const REFRESH_THRESHOLD_SECS: i64 = 300;

/// Token manager
/// Hands out a valid access token, refreshing it against the auth provider
/// when it is close to expiry. State lives on disk; nothing is cached here.
#[derive(Debug, Clone)]
pub struct TokenManager {
    /// Where config and credentials are read from and written to
    store: Store,

    /// HTTP client for refresh requests
    client: Client,

    /// Token refresh threshold in seconds (default: 300 = 5 minutes)
    refresh_threshold: i64,
}

impl TokenManager {
    pub fn new(store: Store, client: Client) -> Self {
        Self {
            store,
            client,
            refresh_threshold: REFRESH_THRESHOLD_SECS,
        }
    }

    /// Override the refresh threshold
    pub fn with_refresh_threshold(mut self, seconds: i64) -> Self {
        self.refresh_threshold = seconds;
        self
    }

    /// Check if the stored token is expiring soon (within threshold)
    fn is_token_expiring_soon(&self, credentials: &CredentialRecord, now: i64) -> bool {
        credentials.seconds_until_expiry(now) <= self.refresh_threshold
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn get_valid_token(&self) -> Result<String> {
        let credentials = self
            .store
            .load_credentials()
            .await
            .ok_or_else(CliError::auth_required)?;

        let now = Utc::now().timestamp();
        if !self.is_token_expiring_soon(&credentials, now) {
            tracing::debug!(
                seconds_left = credentials.seconds_until_expiry(now),
                "Access token still valid"
            );
            return Ok(credentials.access_token);
        }

        self.refresh_token(&credentials).await
    }

    /// Refresh the access token and persist the new credential record.
    /// The stored record is left untouched when the refresh fails.
    pub async fn refresh_token(&self, credentials: &CredentialRecord) -> Result<String> {
        let config = self
            .store
            .load_config()
            .await
            .ok_or_else(CliError::config_missing)?;

        tracing::info!("Refreshing access token for {}", credentials.email);

        let data = provider::refresh_grant(
            &self.client,
            &config.auth_provider_url,
            &config.auth_provider_key,
            &credentials.refresh_token,
        )
        .await
        .map_err(|e| {
            tracing::warn!("Token refresh failed: {}", e);
            refresh_failed()
        })?;

        let expires_at = Utc::now()
            .timestamp()
            .checked_add(data.expires_in)
            .ok_or_else(|| {
                tracing::warn!(expires_in = data.expires_in, "Token refresh returned an unusable expiry");
                refresh_failed()
            })?;

        let updated = CredentialRecord {
            email: credentials.email.clone(),
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            expires_at,
        };

        self.store.save_credentials(&updated).await?;

        tracing::info!(
            "Access token refreshed, expires: {}",
            DateTime::<Utc>::from_timestamp(updated.expires_at, 0)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| updated.expires_at.to_string())
        );

        Ok(updated.access_token)
    }
}

fn refresh_failed() -> CliError {
    CliError::AuthRequired(
        "Token refresh failed. Run `meerkat login` to re-authenticate.".to_string(),
    )
}
