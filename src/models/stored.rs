use serde::{Deserialize, Serialize};

/// Display currency used when the config does not set one
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Non-secret per-installation configuration (`config.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Base URL of the receipt service
    pub server_url: String,

    /// Auth provider endpoint, discovered at login
    #[serde(rename = "supabase_url")]
    pub auth_provider_url: String,

    /// Auth provider public API key, discovered at login
    #[serde(rename = "supabase_anon_key")]
    pub auth_provider_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl ConfigRecord {
    /// Currency to render amounts in
    pub fn currency_or_default(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Secret credential set (`credentials.json`)
///
/// `access_token` and `expires_at` belong together: the record is only ever
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,

    /// Absolute UNIX seconds at which `access_token` expires
    pub expires_at: i64,
}

impl CredentialRecord {
    /// Seconds left before the access token expires (negative once expired)
    pub fn seconds_until_expiry(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_record_uses_provider_field_names() {
        let config = ConfigRecord {
            server_url: "https://themeerkat.app".to_string(),
            auth_provider_url: "https://abc.supabase.co".to_string(),
            auth_provider_key: "anon".to_string(),
            currency: None,
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "server_url": "https://themeerkat.app",
                "supabase_url": "https://abc.supabase.co",
                "supabase_anon_key": "anon"
            })
        );
    }

    #[test]
    fn test_config_record_currency_default() {
        let config: ConfigRecord = serde_json::from_value(json!({
            "server_url": "https://s",
            "supabase_url": "https://a",
            "supabase_anon_key": "k"
        }))
        .unwrap();
        assert_eq!(config.currency, None);
        assert_eq!(config.currency_or_default(), "EUR");

        let config = ConfigRecord {
            currency: Some("USD".to_string()),
            ..config
        };
        assert_eq!(config.currency_or_default(), "USD");
    }

    #[test]
    fn test_seconds_until_expiry() {
        let creds = CredentialRecord {
            email: "a@b.c".to_string(),
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: 1_000,
        };
        assert_eq!(creds.seconds_until_expiry(700), 300);
        assert_eq!(creds.seconds_until_expiry(1_060), -60);
    }
}
