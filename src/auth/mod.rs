// Authentication module
// Login handshake, token lifecycle and auth provider calls

mod login;
mod manager;
mod provider;
mod types;

pub use login::{login, LoginOutcome, LoginParams, AUTH_CONFIG_PATH};
pub use manager::{TokenManager, REFRESH_THRESHOLD_SECS};
pub use provider::{token_url, GrantError};
pub use types::{AuthProviderDefaults, GrantType, TokenResponse};
