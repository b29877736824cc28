// Authentication types

use serde::{Deserialize, Serialize};

/// Grant type sent to the provider token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Email + password exchange performed by `meerkat login`
    Password,

    /// Refresh token exchange performed near expiry
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

/// Password grant request
#[derive(Serialize)]
pub struct PasswordGrantRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Refresh grant request
#[derive(Serialize)]
pub struct RefreshGrantRequest<'a> {
    pub refresh_token: &'a str,
}

/// Token endpoint response (both grants)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<TokenUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    #[serde(default)]
    pub email: Option<String>,
}

/// Auth provider endpoint and public key used when discovery is unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthProviderDefaults {
    pub url: String,
    pub key: String,
}

impl AuthProviderDefaults {
    /// Read the fallback from `MEERKAT_AUTH_URL` / `MEERKAT_AUTH_KEY`.
    /// Both must be set and non-empty.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("MEERKAT_AUTH_URL").ok()?;
        let key = std::env::var("MEERKAT_AUTH_KEY").ok()?;
        Self::from_parts(url, key)
    }

    fn from_parts(url: String, key: String) -> Option<Self> {
        let url = url.trim().trim_end_matches('/').to_string();
        let key = key.trim().to_string();
        if url.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self { url, key })
    }
}
