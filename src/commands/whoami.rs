use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CommandContext;
use crate::error::{CliError, Result};
use crate::store::Store;

/// Login status as reported by `meerkat whoami`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhoamiInfo {
    pub email: String,
    pub server: String,
    pub expires_at: i64,
}

/// Read the current login status from disk (no network)
pub async fn whoami(store: &Store) -> Result<WhoamiInfo> {
    let credentials = store.load_credentials().await.ok_or_else(|| {
        CliError::AuthRequired("Not logged in. Run `meerkat login` first.".to_string())
    })?;

    let server = store
        .load_config()
        .await
        .map(|config| config.server_url)
        .unwrap_or_else(|| "unknown".to_string());

    Ok(WhoamiInfo {
        email: credentials.email,
        server,
        expires_at: credentials.expires_at,
    })
}

/// `2025-01-15 10:30:00 UTC`
pub fn format_expiry(expires_at: i64) -> String {
    DateTime::<Utc>::from_timestamp(expires_at, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| expires_at.to_string())
}

pub async fn run(ctx: &CommandContext) -> Result<()> {
    let info = whoami(&ctx.store).await?;

    let out = ctx.output();
    if out.is_json() {
        out.json(&info);
    } else {
        out.success(&format!("Logged in as {}", info.email));
        out.line(&format!("  Server: {}", info.server));
        out.line(&format!("  Token expires: {}", format_expiry(info.expires_at)));
    }
    Ok(())
}
