// Login handshake: auth-config discovery, then password grant

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

use super::provider::{self, GrantError};
use super::types::{AuthProviderDefaults, GrantType};
use crate::error::{CliError, Result};
use crate::models::{AuthConfigResponse, ConfigRecord, CredentialRecord};
use crate::store::Store;

/// Discovery route on the receipt service
pub const AUTH_CONFIG_PATH: &str = "/api/v1/auth/config";

/// Inputs of a login attempt
#[derive(Debug, Clone)]
pub struct LoginParams {
    pub server_url: String,
    pub email: String,
    pub password: String,
    pub verbose: bool,
}

/// What a successful login reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub email: String,
    pub server: String,
    #[serde(skip)]
    pub expires_at: i64,
}

/// Run the login handshake and persist config and credentials.
///
/// `fallback` is only consulted when discovery fails. Nothing is written to
/// disk unless both steps succeed.
pub async fn login(
    client: &Client,
    store: &Store,
    params: &LoginParams,
    fallback: Option<&AuthProviderDefaults>,
) -> Result<LoginOutcome> {
    let server_url = params.server_url.trim().trim_end_matches('/').to_string();
    if server_url.is_empty() {
        return Err(CliError::Validation("Server URL is required".to_string()));
    }

    let auth_config = discover(client, &server_url, params.verbose, fallback).await?;

    if params.verbose {
        eprintln!(
            "[verbose] POST {}",
            provider::token_url(&auth_config.supabase_url, GrantType::Password)
        );
    }

    let data = provider::password_grant(
        client,
        &auth_config.supabase_url,
        &auth_config.supabase_anon_key,
        &params.email,
        &params.password,
    )
    .await
    .map_err(|e| match e {
        GrantError::Rejected { status: 400, .. } => {
            CliError::Login("Invalid email or password".to_string())
        }
        GrantError::Rejected { status, .. } => {
            CliError::Login(format!("Authentication failed: HTTP {status}"))
        }
        GrantError::Transport(e) => CliError::Http(e),
    })?;

    let expires_at = Utc::now()
        .timestamp()
        .checked_add(data.expires_in)
        .ok_or_else(|| {
            CliError::Login(format!(
                "Authentication failed: invalid token expiry ({})",
                data.expires_in
            ))
        })?;

    store
        .save_config(&ConfigRecord {
            server_url: server_url.clone(),
            auth_provider_url: auth_config.supabase_url,
            auth_provider_key: auth_config.supabase_anon_key,
            currency: None,
        })
        .await?;

    store
        .save_credentials(&CredentialRecord {
            email: params.email.clone(),
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            expires_at,
        })
        .await?;

    tracing::info!("Logged in as {} on {}", params.email, server_url);

    Ok(LoginOutcome {
        email: params.email.clone(),
        server: server_url,
        expires_at,
    })
}

/// Ask the receipt service which auth provider to use
async fn discover(
    client: &Client,
    server_url: &str,
    verbose: bool,
    fallback: Option<&AuthProviderDefaults>,
) -> Result<AuthConfigResponse> {
    let url = format!("{server_url}{AUTH_CONFIG_PATH}");
    if verbose {
        eprintln!("[verbose] GET {url}");
    }

    let failure = match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            return response.json::<AuthConfigResponse>().await.map_err(|e| {
                CliError::Discovery(format!(
                    "Auth config discovery failed: invalid response from {url}: {e}"
                ))
            });
        }
        Ok(response) => format!("{url} returned HTTP {}", response.status().as_u16()),
        Err(e) => format!("could not reach {url}: {e}"),
    };

    match fallback {
        Some(defaults) => {
            if verbose {
                eprintln!("[verbose] Discovery failed ({failure}), using defaults");
            }
            tracing::warn!("Auth config discovery failed ({}), using configured defaults", failure);
            Ok(AuthConfigResponse {
                supabase_url: defaults.url.clone(),
                supabase_anon_key: defaults.key.clone(),
            })
        }
        None => Err(CliError::Discovery(format!(
            "Auth config discovery failed: {failure}"
        ))),
    }
}
