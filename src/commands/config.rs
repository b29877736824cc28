use serde::Serialize;
use serde_json::json;

use super::CommandContext;
use crate::config::ConfigCommand;
use crate::error::{CliError, Result};
use crate::models::DEFAULT_CURRENCY;
use crate::store::Store;

/// Keys accepted by `meerkat config set`
pub const SETTABLE_KEYS: &[&str] = &["server_url", "currency"];

/// Snapshot of the local configuration for `meerkat config show`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub server_url: Option<String>,
    pub currency: String,
    pub email: Option<String>,
    pub config_path: String,
    pub credentials_path: String,
}

pub async fn show(store: &Store) -> ConfigSummary {
    let (config, credentials) = tokio::join!(store.load_config(), store.load_credentials());

    ConfigSummary {
        server_url: config.as_ref().map(|c| c.server_url.clone()),
        currency: config
            .as_ref()
            .map(|c| c.currency_or_default().to_string())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        email: credentials.map(|c| c.email),
        config_path: store.config_path().display().to_string(),
        credentials_path: store.credentials_path().display().to_string(),
    }
}

/// Update one allow-listed key and save the whole record
pub async fn set(store: &Store, key: &str, value: &str) -> Result<()> {
    if !SETTABLE_KEYS.contains(&key) {
        return Err(CliError::Validation(format!(
            "Unknown config key: {key}. Valid keys: {}",
            SETTABLE_KEYS.join(", ")
        )));
    }

    let mut config = store.load_config().await.ok_or_else(|| {
        CliError::Internal(anyhow::anyhow!(
            "No configuration found. Run `meerkat login` first."
        ))
    })?;

    match key {
        "server_url" => config.server_url = value.trim_end_matches('/').to_string(),
        _ => config.currency = Some(value.to_string()),
    }

    store.save_config(&config).await?;
    tracing::debug!(key, "Updated config");
    Ok(())
}

/// Human-readable lines under the "Current configuration" header
pub fn summary_lines(summary: &ConfigSummary) -> Vec<String> {
    vec![
        format!(
            "  Server: {}",
            summary.server_url.as_deref().unwrap_or("not set")
        ),
        format!("  Currency: {}", summary.currency),
        format!(
            "  Email: {}",
            summary.email.as_deref().unwrap_or("not logged in")
        ),
        format!("  Config file: {}", summary.config_path),
        format!("  Credentials file: {}", summary.credentials_path),
    ]
}

pub async fn run(ctx: &CommandContext, command: ConfigCommand) -> Result<()> {
    let out = ctx.output();

    match command {
        ConfigCommand::Show => {
            let summary = show(&ctx.store).await;
            if out.is_json() {
                out.json(&summary);
                return Ok(());
            }

            out.success("Current configuration");
            for line in summary_lines(&summary) {
                out.line(&line);
            }
        }
        ConfigCommand::Set { key, value } => {
            set(&ctx.store, &key, &value).await?;
            if out.is_json() {
                out.json(&json!({ "key": key, "value": value }));
            } else {
                out.success(&format!("Set {key} = {value}"));
            }
        }
    }

    Ok(())
}
