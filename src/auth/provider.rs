// Auth provider token endpoint (password and refresh grants)

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use super::types::{GrantType, PasswordGrantRequest, RefreshGrantRequest, TokenResponse};

/// Failure of a token endpoint call
#[derive(Error, Debug)]
pub enum GrantError {
    /// The provider answered with a non-2xx status
    #[error("token endpoint returned HTTP {status}")]
    Rejected { status: u16, body: String },

    /// The request could not be sent or the response could not be decoded
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Build the token endpoint URL for a grant
pub fn token_url(provider_url: &str, grant: GrantType) -> String {
    format!(
        "{}/auth/v1/token?grant_type={}",
        provider_url.trim_end_matches('/'),
        grant.as_str()
    )
}

/// Exchange email and password for a token pair
pub async fn password_grant(
    client: &Client,
    provider_url: &str,
    api_key: &str,
    email: &str,
    password: &str,
) -> Result<TokenResponse, GrantError> {
    let body = PasswordGrantRequest { email, password };
    request_token(client, provider_url, api_key, GrantType::Password, &body).await
}

/// Exchange a refresh token for a new token pair
pub async fn refresh_grant(
    client: &Client,
    provider_url: &str,
    api_key: &str,
    refresh_token: &str,
) -> Result<TokenResponse, GrantError> {
    let body = RefreshGrantRequest { refresh_token };
    request_token(client, provider_url, api_key, GrantType::RefreshToken, &body).await
}

async fn request_token<B: Serialize>(
    client: &Client,
    provider_url: &str,
    api_key: &str,
    grant: GrantType,
    body: &B,
) -> Result<TokenResponse, GrantError> {
    let url = token_url(provider_url, grant);
    tracing::debug!(url = %url, grant = grant.as_str(), "Requesting token");

    let response = client
        .post(&url)
        .header("apikey", api_key)
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            status = status.as_u16(),
            grant = grant.as_str(),
            "Token endpoint rejected the request"
        );
        return Err(GrantError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let data: TokenResponse = response.json().await?;
    Ok(data)
}
